//! Street-vendor business application.

use std::collections::BTreeMap;

use permit_form::{
    AssetAccept, AssetDelivery, ChoiceOption, ColumnSpec, FieldKind, FieldSpec, FieldValue,
    FormSession, FormSpec, SectionSpec, WireFormat,
};

use crate::api::Encoding;
use crate::api::client::{VENDOR_APPLICATION_PATH, VENDOR_APPLY_PATH};
use crate::orchestrator::{Endpoint, SubmitTarget};

pub const FORM_ID: &str = "vendor_application";

const GOODS: &[&str] = &[
    "Street Food",
    "Snacks",
    "Beverages",
    "Fruits & Vegetables",
    "Clothing",
    "Accessories",
    "Others",
];
const CARTS: &[&str] = &["Push Cart", "Food Stall", "Kiosk", "Table Setup", "None"];
const AREAS: &[&str] = &["School", "Market", "Streets", "Mall"];
const SPECIALTIES: &[&str] = &["Vegetarian", "Halal", "Gluten-Free"];
const CONTACTS: &[&str] = &["SMS", "Email", "Call"];

pub fn spec() -> FormSpec {
    FormSpec {
        id: FORM_ID.into(),
        title: "Apply as Street Vendor".into(),
        version: "1.0.0".into(),
        sections: vec![
            SectionSpec::new(
                "business",
                "Business Information",
                vec![
                    FieldSpec::text("business_name", "Business Name").required(),
                    FieldSpec::new("goods_type", "Type of Goods", choices(GOODS)).required(),
                    FieldSpec::new("cart_type", "Cart Type", choices(CARTS)).required(),
                    FieldSpec::text("operating_hours", "Operating Hours"),
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
                ],
            ),
            SectionSpec::new(
                "area",
                "Area & Delivery",
                vec![
                    FieldSpec::new("area_of_operation", "Area of Operation", multi(AREAS)),
                    FieldSpec::new(
                        "delivery_capability",
                        "Offers Delivery",
                        FieldKind::Boolean,
                    ),
                ],
            ),
            SectionSpec::new(
                "products",
                "Products",
                vec![
                    FieldSpec::new(
                        "products",
                        "Products",
                        FieldKind::List {
                            columns: vec![
                                column("name", "Name", WireFormat::Verbatim),
                                column("category", "Category", WireFormat::Verbatim),
                                column("price", "Price", WireFormat::Number),
                            ],
                        },
                    ),
                    FieldSpec::new("specialty_items", "Specialty Items", multi(SPECIALTIES)),
                ],
            ),
            SectionSpec::new(
                "social",
                "Social Media",
                vec![
                    social("facebook", "Facebook"),
                    social("instagram", "Instagram"),
                    social("tiktok", "TikTok"),
                ],
            ),
            SectionSpec::new(
                "images",
                "Images",
                vec![
                    photo("business_logo_url", "Business Logo"),
                    photo("cart_image_url", "Cart/Stall Image"),
                    photo("vendor_photo_url", "Your Photo"),
                ],
            ),
            SectionSpec::new(
                "contact",
                "Contact Preference",
                vec![FieldSpec::new(
                    "preferred_contact",
                    "Preferred Contact",
                    choices(CONTACTS),
                )],
            ),
        ],
        derivations: Vec::new(),
        constants: BTreeMap::new(),
    }
}

pub fn target() -> SubmitTarget {
    SubmitTarget {
        create: Endpoint::post(VENDOR_APPLY_PATH),
        update: Some(Endpoint::put(VENDOR_APPLICATION_PATH)),
        encoding: Encoding::Json,
        authenticated: true,
    }
}

/// Values a fresh application starts with.
pub fn initial_values() -> Vec<(String, FieldValue)> {
    vec![
        ("preferred_contact".into(), FieldValue::text("SMS")),
        ("delivery_capability".into(), FieldValue::Bool(false)),
    ]
}

/// Products without a category inherit the business's goods type.
pub fn fill_product_categories(session: &mut FormSession) {
    let goods_type = session.fields().text("goods_type").to_string();
    let Some(FieldValue::Rows(rows)) = session.fields().get("products").cloned() else {
        return;
    };
    if goods_type.is_empty() {
        return;
    }
    let rows = rows
        .into_iter()
        .map(|mut row| {
            let category = row.entry("category".to_string()).or_default();
            if category.trim().is_empty() {
                *category = goods_type.clone();
            }
            row
        })
        .collect();
    session.set_field("products", FieldValue::Rows(rows));
}

fn choices(values: &[&str]) -> FieldKind {
    FieldKind::Enum {
        choices: values.iter().map(|value| ChoiceOption::plain(*value)).collect(),
    }
}

fn multi(values: &[&str]) -> FieldKind {
    FieldKind::MultiEnum {
        choices: values.iter().map(|value| ChoiceOption::plain(*value)).collect(),
    }
}

fn column(id: &str, title: &str, wire: WireFormat) -> ColumnSpec {
    ColumnSpec {
        id: id.into(),
        title: title.into(),
        wire,
    }
}

fn social(id: &str, title: &str) -> FieldSpec {
    FieldSpec::text(id, title)
        .wire(WireFormat::NullIfEmpty)
        .wire_path(format!("/social_media/{id}"))
}

fn photo(id: &str, title: &str) -> FieldSpec {
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
}
