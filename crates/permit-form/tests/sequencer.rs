mod common;

use permit_form::{FinalCheck, StepOutcome};

use common::{fill_all_signup, fill_personal, session, signup_spec, text};

#[test]
fn next_advances_exactly_one_section_when_valid() {
    let mut session = session(signup_spec());
    fill_personal(&mut session);

    assert_eq!(session.next(), StepOutcome::Advanced { from: 0, to: 1 });
    assert_eq!(session.section_index(), 1);
    assert!(session.errors().is_empty());
}

#[test]
fn next_stays_put_and_reports_all_errors() {
    let mut session = session(signup_spec());
    session.set_field("firstname", text("Juan"));

    let StepOutcome::Blocked(errors) = session.next() else {
        panic!("expected blocked step");
    };
    assert_eq!(session.section_index(), 0);
    assert_eq!(errors.len(), 3);
    assert_eq!(session.errors(), &errors);
}

#[test]
fn editing_clears_only_that_fields_error() {
    let mut session = session(signup_spec());
    session.next();
    assert!(session.errors().contains_key("lastname"));

    session.set_field("lastname", text("Dela Cruz"));
    assert!(!session.errors().contains_key("lastname"));
    assert!(session.errors().contains_key("firstname"));
}

#[test]
fn previous_is_unconditional_and_keeps_errors() {
    let mut session = session(signup_spec());
    fill_personal(&mut session);
    session.next();
    session.next();
    assert!(!session.errors().is_empty());

    assert_eq!(session.previous(), StepOutcome::Retreated { from: 1, to: 0 });
    assert!(session.errors().contains_key("mobile_no"));
    assert_eq!(session.previous(), StepOutcome::AtFirstSection);
    assert_eq!(session.section_index(), 0);
}

#[test]
fn submit_final_only_from_the_last_section() {
    let mut session = session(signup_spec());
    fill_all_signup(&mut session);

    assert_eq!(
        session.submit_final(),
        FinalCheck::NotOnLastSection {
            current: 0,
            last: 3
        }
    );

    for _ in 0..3 {
        assert!(matches!(session.next(), StepOutcome::Advanced { .. }));
    }
    assert_eq!(session.next(), StepOutcome::AtLastSection);
    assert_eq!(session.submit_final(), FinalCheck::Ready);
}

#[test]
fn submit_final_validates_the_last_section() {
    let mut session = session(signup_spec());
    fill_all_signup(&mut session);
    for _ in 0..3 {
        session.next();
    }
    session.set_field("confirmPassword", text("different1"));

    let FinalCheck::Blocked(errors) = session.submit_final() else {
        panic!("expected blocked submit");
    };
    assert!(errors.contains_key("confirmPassword"));
}

#[test]
fn submit_final_while_submitting_is_in_flight() {
    let mut session = session(signup_spec());
    fill_all_signup(&mut session);
    for _ in 0..3 {
        session.next();
    }
    assert!(session.begin_submission());
    assert_eq!(session.submit_final(), FinalCheck::InFlight);
    assert!(!session.begin_submission());
}
