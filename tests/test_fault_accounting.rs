/// Page-fault properties of the three strategies against the real OS.
///
/// The fault counter is per process and libtest runs tests on parallel
/// threads, so everything that reads it lives in a single test function.

use pagetouch::{run_benchmark, BenchConfig, BenchReport, PrefetchStatus, Strategy, WritePattern};

// 40 MB: above glibc's largest dynamic mmap threshold (32 MiB), so every run
// gets a fresh mapping instead of recycled, already-resident heap pages.
const ELEMENTS: usize = 10_000_000;
const STRIDE: usize = 1000;

// Faults outside the block (stack, allocator bookkeeping) a phase may pick up.
const SLACK: u64 = 32;

fn config(strategy: Strategy) -> BenchConfig {
    BenchConfig::new(strategy)
        .with_elements(ELEMENTS)
        .with_stride(STRIDE)
        .with_pattern(WritePattern::Index)
}

/// With THP in `always` mode one fault maps 2 MiB, so per-page counts do not hold.
#[cfg(target_os = "linux")]
fn huge_pages_always() -> bool {
    std::fs::read_to_string("/sys/kernel/mm/transparent_hugepage/enabled")
        .map(|s| s.contains("[always]"))
        .unwrap_or(false)
}

#[cfg(not(target_os = "linux"))]
fn huge_pages_always() -> bool {
    false
}

fn faults(r: &BenchReport) -> (u64, u64) {
    (r.strategy_faults.unwrap(), r.loop_faults.unwrap())
}

/// Every page is faulted in by exactly the phase that first touches it.
/// The loop's last visited element may stop one page short of the block end.
fn assert_faults_every_page(phase: &str, count: u64, pages: usize) {
    let pages = pages as u64;
    assert!(
        count + 1 >= pages && count <= pages + SLACK,
        "{phase}: {count} faults for {pages} pages"
    );
}

#[cfg(unix)]
#[test]
fn test_strategy_fault_profiles() {
    println!("=== Strategy Fault Profiles ===");

    let lazy = run_benchmark(&config(Strategy::Lazy)).unwrap();
    let eager = run_benchmark(&config(Strategy::Eager)).unwrap();
    let prefetch = run_benchmark(&config(Strategy::Prefetch)).unwrap();

    for r in [&lazy, &eager, &prefetch] {
        println!(
            "{:>8}: {:.6} s, {} pages, strategy faults {:?}, loop faults {:?}",
            r.strategy.as_str(),
            r.elapsed.as_secs_f64(),
            r.pages,
            r.strategy_faults,
            r.loop_faults
        );
        assert!(r.has_fault_counts(), "getrusage is available on unix");
        assert_eq!(r.touched, config(r.strategy).touched_elements());
        assert_eq!(r.touched, 10_000);
        assert!(r.samples.windows(2).all(|w| w[1].follows(&w[0])));
    }
    let pages = lazy.pages;
    assert_eq!(pages, 40_000_000usize.div_ceil(lazy.page_size));

    let (lazy_strategy, lazy_loop) = faults(&lazy);
    let (eager_strategy, eager_loop) = faults(&eager);
    let (prefetch_strategy, prefetch_loop) = faults(&prefetch);

    // Lazy pays nothing up front.
    assert_eq!(lazy_strategy, 0);

    if huge_pages_always() {
        println!("THP is 'always': checking relative profiles only");
        assert!(lazy_loop > 0);
        assert!(eager_strategy > 0);
        assert!(eager_loop < lazy_loop);
    } else {
        // Stride 1000 × 4 B is under one page, so the loop touches every page.
        assert_faults_every_page("lazy loop", lazy_loop, pages);
        assert_faults_every_page("eager fill", eager_strategy, pages);
        assert!(eager_loop <= SLACK, "eager loop faults: {eager_loop}");
    }

    match &prefetch.prefetch {
        Some(PrefetchStatus::Issued) => {
            println!("prefetch status: issued");
            if huge_pages_always() {
                assert!(prefetch_strategy > 0);
                assert!(prefetch_loop < lazy_loop);
            } else {
                assert_faults_every_page("prefetch", prefetch_strategy, pages);
                assert!(prefetch_loop <= SLACK, "prefetch loop faults: {prefetch_loop}");
            }
        }
        Some(status) => {
            // Degraded prefetch runs as lazy.
            println!("prefetch status: {status}");
            assert!(status.is_degraded());
            assert!(prefetch_strategy <= SLACK);
            assert!(prefetch_loop > 0);
        }
        None => panic!("prefetch run must report its status"),
    }

    println!("✅ Fault profiles completed");
}
