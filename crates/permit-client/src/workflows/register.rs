//! Resident account registration.

use std::collections::BTreeMap;

use permit_form::{
    AssetAccept, AssetDelivery, ChoiceOption, Derivation, FieldKind, FieldSpec, FormSpec, Rule,
    SectionSpec, WireFormat, barangay_choices,
};
use serde_json::json;

use crate::api::Encoding;
use crate::api::client::REGISTER_PATH;
use crate::orchestrator::{Endpoint, SubmitTarget};

pub const FORM_ID: &str = "register";
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_AGE: i32 = 18;

pub fn spec() -> FormSpec {
    FormSpec {
        id: FORM_ID.into(),
        title: "Create Account".into(),
        version: "1.0.0".into(),
        sections: vec![personal(), contact(), address(), security()],
        derivations: vec![
            Derivation::AgeFromBirthday {
                source: "birthday".into(),
                target: "age".into(),
            },
            Derivation::ZipFromBarangay {
                source: "barangay".into(),
                target: "zip_code".into(),
            },
        ],
        constants: BTreeMap::from([("role".to_string(), json!("user"))]),
    }
}

pub fn target() -> SubmitTarget {
    SubmitTarget {
        create: Endpoint::post(REGISTER_PATH),
        update: None,
        encoding: Encoding::Multipart,
        authenticated: false,
    }
}

fn personal() -> SectionSpec {
    SectionSpec::new(
        "personal",
        "Personal Information",
        vec![
            FieldSpec::new(
                "img",
                "Profile Photo",
                FieldKind::Asset {
                    accept: AssetAccept::Image,
                    multiple: false,
                    delivery: AssetDelivery::Inline,
                },
            ),
            FieldSpec::text("firstname", "First Name").required(),
            FieldSpec::text("middlename", "Middle Name"),
            FieldSpec::text("lastname", "Last Name").required(),
            FieldSpec::new("birthday", "Birthday", FieldKind::Date)
                .required()
                .rule(Rule::MinAge { years: MIN_AGE }),
            FieldSpec::new("age", "Age", FieldKind::Integer).read_only(),
            FieldSpec::new(
                "gender",
                "Gender",
                FieldKind::Enum {
                    choices: vec![
                        ChoiceOption::new("male", "Male"),
                        ChoiceOption::new("female", "Female"),
                        ChoiceOption::new("other", "Other"),
                    ],
                },
            )
            .required(),
        ],
    )
}

fn contact() -> SectionSpec {
    SectionSpec::new(
        "contact",
        "Contact Information",
        vec![
            FieldSpec::text("mobile_no", "Mobile Number")
                .required()
                .rule(Rule::Digits { count: 11 }),
            FieldSpec::text("landline_no", "Landline Number"),
            FieldSpec::text("email", "Email").required().rule(Rule::Email),
        ],
    )
}

fn address() -> SectionSpec {
    SectionSpec::new(
        "address",
        "Address",
        vec![
            FieldSpec::text("address", "Address").required(),
            FieldSpec::new(
                "barangay",
                "Barangay",
                FieldKind::Enum {
                    choices: barangay_choices(),
                },
            )
            .required(),
            FieldSpec::text("zip_code", "Zip Code")
                .required()
                .rule(Rule::Digits { count: 4 }),
        ],
    )
}

fn security() -> SectionSpec {
    SectionSpec::new(
        "security",
        "Account Security",
        vec![
            FieldSpec::text("password", "Password")
                .required()
                .secret()
                .rule(Rule::MinLength {
                    min: MIN_PASSWORD_LENGTH,
                }),
            FieldSpec::text("confirmPassword", "Confirm Password")
                .secret()
                .rule(Rule::Matches {
                    field: "password".into(),
                })
                .wire(WireFormat::Omit),
        ],
    )
}
