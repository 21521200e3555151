//! End-to-end behavior of testsuites and the runner.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;
use verdict::prelude::*;
use verdict::{Error, SuiteState};

fn both_strategies() -> [Strategy; 2] {
    [Strategy::Sequential, Strategy::Parallel]
}

fn three_outcomes(strategy: Strategy) -> Testsuite {
    let mut suite =
        Testsuite::new("outcomes", strategy).with_config(SuiteConfig::new().with_workers(2));
    suite
        .test("test1", || Ok(()))
        .test("test2", || {
            assert_eq(&1, &2)?;
            Ok(())
        })
        .test("test3", || Err(anyhow::anyhow!("runtime failure")));
    suite
}

mod outcome_tests {
    use super::*;

    #[test]
    fn pass_fail_error_are_counted() {
        for strategy in both_strategies() {
            let mut suite = three_outcomes(strategy);
            suite.run().unwrap();

            let stats = suite.statistics();
            assert_eq!(stats.tests(), 3, "{strategy}");
            assert_eq!(stats.failures(), 1, "{strategy}");
            assert_eq!(stats.errors(), 1, "{strategy}");
            assert_eq!(stats.successes(), 1, "{strategy}");

            let cases = suite.testcases();
            assert_eq!(cases[0].result(), TestResult::Passed);
            assert_eq!(cases[1].result(), TestResult::Failed);
            assert!(cases[1].reason().contains("Expected 1 to be equals 2"));
            assert!(cases[1].location().is_some());
            assert_eq!(cases[2].result(), TestResult::Errored);
            assert_eq!(cases[2].reason(), "runtime failure");
        }
    }

    #[test]
    fn panics_are_errors() {
        for strategy in both_strategies() {
            let mut suite = Testsuite::new("panics", strategy);
            suite
                .test("message", || panic!("kaboom"))
                .test("opaque", || std::panic::panic_any(7_u8));
            suite.run().unwrap();

            let cases = suite.testcases();
            assert_eq!(cases[0].result(), TestResult::Errored, "{strategy}");
            assert_eq!(cases[0].reason(), "kaboom");
            assert!(cases[0].cerr().contains("kaboom"), "{strategy}");
            assert_eq!(cases[1].reason(), verdict::UNKNOWN_ERROR);
            assert!(cases[1].cout().is_empty());
        }
    }

    #[test]
    fn report_order_matches_registration() {
        for strategy in both_strategies() {
            let mut suite = Testsuite::new("order", strategy);
            for name in ["A", "B", "C"] {
                suite.test(name, || Ok(()));
            }
            suite.run().unwrap();
            let names: Vec<_> = suite.testcases().iter().map(|c| c.name()).collect();
            assert_eq!(names, ["A", "B", "C"], "{strategy}");
        }
    }
}

mod lifecycle_tests {
    use super::*;

    #[test]
    fn second_run_changes_nothing() {
        for strategy in both_strategies() {
            let calls = Arc::new(Mutex::new(0));
            let counter = Arc::clone(&calls);
            let mut suite = Testsuite::new("idempotent", strategy);
            suite.test("counted", move || {
                *counter.lock() += 1;
                Ok(())
            });

            suite.run().unwrap();
            let first = *suite.statistics();
            let duration = suite.testcases()[0].duration();
            suite.run().unwrap();

            assert_eq!(*calls.lock(), 1, "{strategy}");
            assert_eq!(*suite.statistics(), first);
            assert_eq!(suite.testcases()[0].duration(), duration);
        }
    }

    #[test]
    fn throwing_before_each_still_runs_case() {
        for strategy in both_strategies() {
            let mut suite = Testsuite::new("hooks", strategy);
            suite
                .before_each(|| Err(anyhow::anyhow!("fixture failed")))
                .after_each(|| panic!("cleanup failed"))
                .test("body", || Ok(()));
            suite.run().unwrap();
            assert_eq!(suite.testcases()[0].result(), TestResult::Passed, "{strategy}");
        }
    }

    #[test]
    fn hook_failures_are_reported_to_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut suite = Testsuite::sequential("handler");
        suite
            .setup(|| Err(anyhow::anyhow!("no database")))
            .on_hook_error(move |failure| sink.lock().push(failure.clone()))
            .test("body", || Ok(()));
        suite.run().unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, verdict::HookKind::Setup);
        assert_eq!(seen[0].reason, "no database");
        assert!(seen[0].testcase.is_none());
    }
}

mod parallel_tests {
    use super::*;

    #[test]
    fn overflow_is_raised_before_anything_runs() {
        let mut suite = Testsuite::parallel("overflow")
            .with_config(SuiteConfig::new().with_scheduler_limit(1024));
        for i in 0..1025 {
            suite.test(format!("case-{i}"), || Ok(()));
        }

        match suite.run() {
            Err(Error::SchedulerOverflow { cases, limit, .. }) => {
                assert_eq!(cases, 1025);
                assert_eq!(limit, 1024);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
        assert_eq!(suite.state(), SuiteState::Pending);
        assert!(suite.testcases().iter().all(|c| c.result() == TestResult::Undone));
    }

    #[test]
    fn at_limit_runs() {
        let mut suite =
            Testsuite::parallel("edge").with_config(SuiteConfig::new().with_scheduler_limit(8));
        for i in 0..8 {
            suite.test(format!("case-{i}"), || Ok(()));
        }
        suite.run().unwrap();
        assert_eq!(suite.statistics().successes(), 8);
    }

    #[test]
    fn elapsed_is_slowest_worker_not_sum() {
        let gate = Arc::new(Barrier::new(4));
        let mut suite =
            Testsuite::parallel("timing").with_config(SuiteConfig::new().with_workers(4));
        for i in 0..4 {
            let gate = Arc::clone(&gate);
            suite.test(format!("sleep-{i}"), move || {
                // Every worker holds exactly one case once the gate opens.
                gate.wait();
                std::thread::sleep(Duration::from_millis(20));
                Ok(())
            });
        }
        suite.run().unwrap();

        let sum: Duration = suite.testcases().iter().map(|c| c.duration()).sum();
        let longest = suite
            .testcases()
            .iter()
            .map(|c| c.duration())
            .max()
            .unwrap();
        assert_eq!(suite.execution_time(), longest);
        assert!(suite.execution_time() < sum);
    }

    #[test]
    fn per_case_hooks_run_once_per_case() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let (b, a) = (Arc::clone(&before), Arc::clone(&after));
        let mut suite =
            Testsuite::parallel("hooks").with_config(SuiteConfig::new().with_workers(3));
        suite
            .before_each(move || {
                b.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .after_each(move || {
                a.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        for i in 0..10 {
            suite.test(format!("case-{i}"), || Ok(()));
        }
        suite.run().unwrap();

        assert_eq!(before.load(Ordering::SeqCst), 10);
        assert_eq!(after.load(Ordering::SeqCst), 10);
    }
}

mod capture_tests {
    use super::*;

    #[test]
    fn output_belongs_to_its_case() {
        for strategy in both_strategies() {
            let mut suite = Testsuite::new("capture", strategy);
            suite
                .test("talks", || {
                    cout!("hello");
                    cerrln!("oops");
                    Ok(())
                })
                .test("silent", || Ok(()));
            suite.run().unwrap();

            let cases = suite.testcases();
            assert_eq!(cases[0].cout(), "hello", "{strategy}");
            assert_eq!(cases[0].cerr(), "oops\n", "{strategy}");
            assert_eq!(cases[1].cout(), "", "{strategy}");
            assert!(cases[1].output().is_empty());
        }
    }

    #[test]
    fn output_survives_failure() {
        let mut suite = Testsuite::sequential("capture-fail");
        suite.test("fails loudly", || {
            coutln!("about to fail");
            assert_true(false)?;
            Ok(())
        });
        suite.run().unwrap();
        let case = &suite.testcases()[0];
        assert_eq!(case.result(), TestResult::Failed);
        assert_eq!(case.cout(), "about to fail\n");
    }

    #[test]
    fn nothing_is_bound_after_run() {
        let mut suite = Testsuite::sequential("unbind");
        suite.test("a", || Ok(()));
        suite.run().unwrap();
        assert!(!verdict::capture::is_capturing());
    }
}

mod runner_tests {
    use super::*;

    fn register_tests(runner: &mut Runner) {
        runner
            .describe("math")
            .test("add", || {
                assert_eq(&(2 + 2), &4)?;
                Ok(())
            })
            .test("compare", || {
                assert_that(&5, greater_than(), &3)?;
                Ok(())
            });
        runner
            .describe_parallel("text")
            .test("substring", || {
                assert_in("ell", "hello")?;
                Ok(())
            })
            .test("pattern", || {
                assert_like("order #42", r"#\d+")?;
                Ok(())
            });
    }

    #[test]
    fn explicit_registration_entry_point() {
        let mut runner = Runner::new();
        register_tests(&mut runner);
        runner.run().unwrap();

        assert!(runner.is_success());
        assert_eq!(runner.totals().tests(), 4);
        assert!(runner.testsuites().iter().all(|s| s.state() == SuiteState::Done));
    }

    #[test]
    fn global_runner_is_shared() {
        Runner::global().describe("global-suite").test("a", || Ok(()));
        let names: Vec<String> = Runner::global()
            .testsuites()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "global-suite"));
    }

    #[test]
    fn include_filter_narrows_run() {
        let mut runner = Runner::new();
        register_tests(&mut runner);
        runner.filter(Filter::new().include("text/"));
        runner.run().unwrap();

        assert_eq!(runner.testsuites()[0].statistics().tests(), 0);
        assert_eq!(runner.testsuites()[1].statistics().tests(), 2);
    }
}
