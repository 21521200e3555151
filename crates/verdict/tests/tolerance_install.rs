//! Process-wide tolerance installation. Kept in its own test binary because
//! the tolerance can only be installed once per process.

use verdict::{Comparator, Error, Tolerance, equals};

#[test]
fn install_once_then_refuse() {
    assert_eq!(Tolerance::current(), Tolerance::machine());
    assert!(equals().compare(&1.0_f64, &1.001).is_failure());

    Tolerance::uniform(0.01).install().unwrap();
    assert_eq!(Tolerance::current(), Tolerance::uniform(0.01));
    assert!(equals().compare(&1.0_f64, &1.001).is_success());
    assert!(equals().compare(&1.0_f32, &1.001_f32).is_success());

    let err = Tolerance::machine().install().unwrap_err();
    assert!(matches!(err, Error::ToleranceAlreadyInstalled));
    assert_eq!(Tolerance::current(), Tolerance::uniform(0.01));
}
