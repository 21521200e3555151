//! Dynamic distribution of testcases over a worker pool.
//!
//! Each worker repeatedly claims the next unclaimed index from a shared
//! cursor, runs that testcase with its own capture buffers bound, and keeps
//! local counters that are merged into the suite statistics once the worker
//! runs out of work. Setup and teardown run on the calling thread.

use parking_lot::Mutex;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicU32, Ordering};

use super::{Fixture, HookKind};
use crate::capture::ParallelCaptureProxy;
use crate::config::SuiteConfig;
use crate::error::{Error, Result};
use crate::statistics::{Statistics, WorkerTally};
use crate::testcase::Testcase;

pub(super) fn run(
    fixture: &Fixture<'_>,
    config: &SuiteConfig,
    cases: &mut [Testcase],
    statistics: &mut Statistics,
) -> Result<()> {
    let limit = config.effective_scheduler_limit();
    let overflow = || Error::SchedulerOverflow {
        suite: fixture.suite.to_string(),
        cases: cases.len(),
        limit,
    };
    if cases.len() > limit {
        return Err(overflow());
    }
    let total = u32::try_from(cases.len()).map_err(|_| overflow())?;

    let workers = config.workers.get();
    let prefix = fixture.suite.to_string();
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |index| format!("verdict-{prefix}-{index}"))
        .build()?;

    statistics.set_tests(cases.len());
    let proxy = ParallelCaptureProxy::install(workers);

    fixture.invoke(HookKind::Setup, None);

    let slots: Vec<Mutex<&mut Testcase>> = cases.iter_mut().map(Mutex::new).collect();
    let cursor = AtomicU32::new(0);
    let shared = Mutex::new(statistics);

    pool.broadcast(|ctx| {
        let worker = ctx.index();
        let _binding = proxy.bind(worker);
        let mut tally = WorkerTally::default();

        while let Ok(index) = cursor.fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
            (next < total).then_some(next + 1)
        }) {
            let mut case = slots[index as usize].lock();
            if case.result().is_done() {
                continue;
            }
            fixture.invoke(HookKind::BeforeEach, Some(case.name()));
            let result = case.run();
            tally.record(result, case.duration());
            fixture.invoke(HookKind::AfterEach, Some(case.name()));
            case.record_output(proxy.take(worker));
        }

        shared.lock().absorb_worker(&tally);
    });

    fixture.invoke(HookKind::Teardown, None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::SuiteConfig;
    use crate::error::Error;
    use crate::suite::{SuiteState, Testsuite};
    use crate::testcase::TestResult;
    use crate::{coutln, assertion::assert_eq};
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn pool_of(workers: usize) -> SuiteConfig {
        SuiteConfig::new().with_workers(workers)
    }

    #[test]
    fn every_case_runs_exactly_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut suite = Testsuite::parallel("once").with_config(pool_of(4));
        for i in 0..64 {
            let seen = Arc::clone(&seen);
            suite.test(format!("case-{i}"), move || {
                seen.lock().push(i);
                Ok(())
            });
        }
        suite.run().unwrap();

        let mut seen = seen.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..64).collect::<Vec<_>>());
        assert_eq!(suite.statistics().tests(), 64);
        assert!(suite.statistics().is_success());
    }

    #[test]
    fn report_order_is_insertion_order() {
        let mut suite = Testsuite::parallel("order").with_config(pool_of(3));
        for name in ["A", "B", "C"] {
            suite.test(name, || Ok(()));
        }
        suite.run().unwrap();
        let names: Vec<_> = suite.testcases().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn results_are_counted() {
        let mut suite = Testsuite::parallel("mixed").with_config(pool_of(2));
        suite
            .test("pass", || Ok(()))
            .test("fail", || {
                assert_eq(&1, &2)?;
                Ok(())
            })
            .test("error", || anyhow::bail!("boom"));
        suite.run().unwrap();

        let stats = suite.statistics();
        assert_eq!(stats.tests(), 3);
        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.successes(), 1);
        assert_eq!(suite.testcases()[2].result(), TestResult::Errored);
    }

    #[test]
    fn output_stays_with_its_case() {
        let mut suite = Testsuite::parallel("output").with_config(pool_of(4));
        for i in 0..16 {
            suite.test(format!("case-{i}"), move || {
                coutln!("from {i}");
                Ok(())
            });
        }
        suite.run().unwrap();
        for (i, case) in suite.testcases().iter().enumerate() {
            assert_eq!(case.cout(), format!("from {i}\n"));
        }
    }

    #[test]
    fn workers_are_distinct_threads() {
        let threads = Arc::new(Mutex::new(HashSet::new()));
        let mut suite = Testsuite::parallel("threads").with_config(pool_of(2));
        for i in 0..8 {
            let threads = Arc::clone(&threads);
            suite.test(format!("case-{i}"), move || {
                std::thread::sleep(Duration::from_millis(5));
                threads.lock().insert(std::thread::current().id());
                Ok(())
            });
        }
        suite.run().unwrap();
        assert!(!threads.lock().contains(&std::thread::current().id()));
    }

    #[test]
    fn overflow_runs_nothing() {
        let hooked = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&hooked);
        let mut suite =
            Testsuite::parallel("overflow").with_config(pool_of(2).with_scheduler_limit(2));
        suite.setup(move || {
            *flag.lock() = true;
            Ok(())
        });
        for name in ["a", "b", "c"] {
            suite.test(name, || Ok(()));
        }

        let err = suite.run().unwrap_err();
        assert!(matches!(
            err,
            Error::SchedulerOverflow { cases: 3, limit: 2, .. }
        ));
        assert!(!*hooked.lock());
        assert_eq!(suite.state(), SuiteState::Pending);
        assert!(suite.testcases().iter().all(|c| c.result() == TestResult::Undone));
    }
}
