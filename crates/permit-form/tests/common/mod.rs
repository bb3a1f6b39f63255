#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use time::macros::date;

use permit_form::{
    AssetAccept, AssetDelivery, ChoiceOption, ColumnSpec, Derivation, FieldKind, FieldSpec,
    FieldValue, FixedClock, FormSession, FormSpec, Rule, SectionSpec, StagedAsset, WireFormat,
    barangay_choices,
};

pub fn today() -> time::Date {
    date!(2024 - 06 - 14)
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(today()))
}

/// Four sections shaped like resident registration.
pub fn signup_spec() -> FormSpec {
    FormSpec {
        id: "signup".into(),
        title: "Sign up".into(),
        version: "1.0.0".into(),
        sections: vec![
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
                    FieldSpec::text("lastname", "Last Name").required(),
                    FieldSpec::new("birthday", "Birthday", FieldKind::Date)
                        .required()
                        .rule(Rule::MinAge { years: 18 }),
                    FieldSpec::new("age", "Age", FieldKind::Integer).read_only(),
                    FieldSpec::new(
                        "gender",
                        "Gender",
                        FieldKind::Enum {
                            choices: vec![
                                ChoiceOption::new("male", "Male"),
                                ChoiceOption::new("female", "Female"),
                            ],
                        },
                    )
                    .required(),
                ],
            ),
            SectionSpec::new(
                "contact",
                "Contact",
                vec![
                    FieldSpec::text("mobile_no", "Mobile Number")
                        .required()
                        .rule(Rule::Digits { count: 11 }),
                    FieldSpec::text("email", "Email").required().rule(Rule::Email),
                ],
            ),
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
            ),
            SectionSpec::new(
                "security",
                "Account Security",
                vec![
                    FieldSpec::text("password", "Password")
                        .required()
                        .secret()
                        .rule(Rule::MinLength { min: 8 }),
                    FieldSpec::text("confirmPassword", "Confirm Password")
                        .secret()
                        .rule(Rule::Matches {
                            field: "password".into(),
                        })
                        .wire(WireFormat::Omit),
                ],
            ),
        ],
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

/// Shop application with uploaded photos, product rows and nested handles.
pub fn shop_spec() -> FormSpec {
    let photo = |id: &str, title: &str| {
        FieldSpec::new(
            id,
            title,
            FieldKind::Asset {
                accept: AssetAccept::Image,
                multiple: false,
                delivery: AssetDelivery::Upload,
            },
        )
        .required()
    };
    FormSpec {
        id: "shop".into(),
        title: "Shop".into(),
        version: "1.0.0".into(),
        sections: vec![
            SectionSpec::new(
                "business",
                "Business",
                vec![
                    FieldSpec::text("business_name", "Business Name").required(),
                    FieldSpec::new(
                        "years_in_operation",
                        "Years in Operation",
                        FieldKind::Enum {
                            choices: vec![
                                ChoiceOption::new("0", "< 1 year"),
                                ChoiceOption::new("1", "1-2 years"),
                                ChoiceOption::new("3", "3-5 years"),
                                ChoiceOption::new("5", "5+ years"),
                            ],
                        },
                    )
                    .wire(WireFormat::Integer),
                    FieldSpec::new(
                        "products",
                        "Products",
                        FieldKind::List {
                            columns: vec![
                                ColumnSpec {
                                    id: "name".into(),
                                    title: "Name".into(),
                                    wire: WireFormat::Verbatim,
                                },
                                ColumnSpec {
                                    id: "price".into(),
                                    title: "Price".into(),
                                    wire: WireFormat::Number,
                                },
                            ],
                        },
                    ),
                    FieldSpec::text("facebook", "Facebook")
                        .wire(WireFormat::NullIfEmpty)
                        .wire_path("/social_media/facebook"),
                ],
            ),
            SectionSpec::new(
                "images",
                "Images",
                vec![
                    photo("vendor_profile_image", "Vendor Photo"),
                    photo("cart_image", "Cart Photo"),
                    photo("business_logo", "Business Logo"),
                ],
            ),
        ],
        derivations: Vec::new(),
        constants: BTreeMap::new(),
    }
}

pub fn session(spec: FormSpec) -> FormSession {
    FormSession::new(Arc::new(spec), clock())
}

pub fn image(name: &str, size_bytes: u64) -> StagedAsset {
    StagedAsset {
        local_ref: format!("file:///tmp/{name}"),
        mime_type: "image/jpeg".into(),
        display_name: name.into(),
        size_bytes,
    }
}

pub fn text(value: &str) -> FieldValue {
    FieldValue::text(value)
}

pub fn fill_personal(session: &mut FormSession) {
    session.set_field("firstname", text("Juan"));
    session.set_field("lastname", text("Dela Cruz"));
    session.set_field("birthday", text("2000-06-15"));
    session.set_field("gender", text("male"));
}

pub fn fill_all_signup(session: &mut FormSession) {
    fill_personal(session);
    session.set_field("mobile_no", text("09171234567"));
    session.set_field("email", text("juan@example.com"));
    session.set_field("address", text("12 Shaw Blvd"));
    session.set_field("barangay", text("Kapitolyo"));
    session.set_field("password", text("s3cretpass"));
    session.set_field("confirmPassword", text("s3cretpass"));
}
