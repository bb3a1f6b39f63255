use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::json;

fn permit_client(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("permit-client").unwrap();
    cmd.env("PERMIT_CONFIG", home.child("config.toml").path())
        .env("PERMIT_DATA_DIR", home.child("data").path())
        .env("PERMIT_BASE_URL", "http://127.0.0.1:9")
        .env("PERMIT_LOG", "off")
        .env_remove("PERMIT_PASSWORD");
    cmd
}

fn valid_registration() -> serde_json::Value {
    json!({
        "firstname": "Juan",
        "lastname": "Dela Cruz",
        "birthday": "1990-05-17",
        "gender": "male",
        "mobile_no": "09171234567",
        "email": "juan@example.ph",
        "address": "12 Shaw Blvd",
        "barangay": "Kapitolyo",
        "password": "s3cret-pass",
        "confirmPassword": "s3cret-pass",
    })
}

#[test]
fn schema_prints_the_form_definition_schema() {
    let home = TempDir::new().unwrap();
    permit_client(&home)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sections\""));
}

#[test]
fn schema_for_a_workflow_prints_its_sections() {
    let home = TempDir::new().unwrap();
    permit_client(&home)
        .args(["schema", "--workflow", "vendor-application"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("/social_media/facebook")
                .and(predicate::str::contains("\"vendor_photo_url\"")),
        );
}

#[test]
fn check_accepts_a_complete_registration() {
    let home = TempDir::new().unwrap();
    let answers = home.child("answers.json");
    answers.write_str(&valid_registration().to_string()).unwrap();

    permit_client(&home)
        .args(["check", "register", "--answers"])
        .arg(answers.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All 4 sections are valid."));
}

#[test]
fn check_reports_the_blocking_section_without_echoing_values() {
    let home = TempDir::new().unwrap();
    let mut answers = valid_registration();
    answers["email"] = json!("juan-at-example");
    let file = home.child("answers.json");
    file.write_str(&answers.to_string()).unwrap();

    permit_client(&home)
        .args(["check", "register", "--json", "--answers"])
        .arg(file.path())
        .assert()
        .failure()
        .stdout(
            predicate::str::contains("\"valid\": false")
                .and(predicate::str::contains("\"contact\""))
                .and(predicate::str::contains("\"email\""))
                .and(predicate::str::contains("s3cret-pass").not()),
        )
        .stderr(predicate::str::contains("need attention"));
}

#[test]
fn check_rejects_an_unreadable_answers_file() {
    let home = TempDir::new().unwrap();
    let file = home.child("answers.json");
    file.write_str("{ nope").unwrap();

    permit_client(&home)
        .args(["check", "register", "--answers"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid answers"));
}

#[test]
fn submit_refuses_updates_for_registration() {
    let home = TempDir::new().unwrap();
    let file = home.child("answers.json");
    file.write_str(&valid_registration().to_string()).unwrap();

    permit_client(&home)
        .args(["submit", "register", "--update", "--answers"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not support updates"));
}

#[test]
fn gallery_requires_a_signed_in_user() {
    let home = TempDir::new().unwrap();
    permit_client(&home)
        .args(["gallery", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("please login first"));
}

#[test]
fn logout_without_a_session_succeeds() {
    let home = TempDir::new().unwrap();
    permit_client(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));
}

#[test]
fn login_requires_a_password() {
    let home = TempDir::new().unwrap();
    permit_client(&home)
        .args(["login", "--email", "juan@example.ph"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--password"));
}

#[test]
fn submit_rejects_two_files_for_a_single_file_field() {
    let home = TempDir::new().unwrap();
    let answers = home.child("answers.json");
    answers.write_str("{}").unwrap();
    let first = home.child("cart.jpg");
    first.write_binary(b"jpeg").unwrap();
    let second = home.child("cart-side.jpg");
    second.write_binary(b"jpeg").unwrap();

    permit_client(&home)
        .args(["submit", "vendor-application", "--answers"])
        .arg(answers.path())
        .arg(format!("--asset=cart_image_url={}", first.path().display()))
        .arg(format!("--asset=cart_image_url={}", second.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("'cart_image_url' takes one file, got 2"));
}

#[test]
fn bad_environment_values_are_logged_once_logging_is_up() {
    let home = TempDir::new().unwrap();
    permit_client(&home)
        .env("PERMIT_LOG", "warn")
        .env("PERMIT_TIMEOUT_SECS", "soon")
        .arg("schema")
        .assert()
        .success()
        .stderr(predicate::str::contains("Invalid PERMIT_TIMEOUT_SECS value 'soon'"));
}
