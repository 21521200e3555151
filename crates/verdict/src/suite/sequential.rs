//! In-order execution on the calling thread.

use super::{Fixture, HookKind};
use crate::capture::CaptureProxy;
use crate::statistics::Statistics;
use crate::testcase::Testcase;

pub(super) fn run(fixture: &Fixture<'_>, cases: &mut [Testcase], statistics: &mut Statistics) {
    statistics.set_tests(cases.len());

    let proxy = CaptureProxy::install();
    fixture.invoke(HookKind::Setup, None);
    // Setup chatter is not attributed to the first testcase.
    proxy.clear();

    for case in cases.iter_mut().filter(|case| !case.result().is_done()) {
        fixture.invoke(HookKind::BeforeEach, Some(case.name()));
        let result = case.run();
        statistics.record(result);
        statistics.add_elapsed(case.duration());
        fixture.invoke(HookKind::AfterEach, Some(case.name()));
        case.record_output(proxy.take());
    }

    fixture.invoke(HookKind::Teardown, None);
}
