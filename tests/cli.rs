//! End-to-end tests of the `pwa_packager` binary in manifest-only mode.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// Variables a CI runner may export that would leak into the tests.
const CI_VARS: [&str; 20] = [
    "PWA_BASE_URL",
    "GITHUB_RUN_NUMBER",
    "GITHUB_REPOSITORY",
    "PWA_MANIFEST_PATH",
    "PACKAGE_JSON_PATH",
    "JAVA_HOME",
    "ANDROID_HOME",
    "ANDROID_PACKAGE_ID",
    "ANDROID_KEYSTORE_PASSWORD",
    "IOS_BUNDLE_ID",
    "IOS_TEAM_ID",
    "IOS_KEYCHAIN_PASSWORD",
    "IOS_CERTIFICATE_BASE64",
    "IOS_CERTIFICATE_PASSWORD",
    "WINDOWS_IDENTITY_NAME",
    "WINDOWS_PUBLISHER",
    "WINDOWS_CERTIFICATE_PASSWORD",
    "WINDOWS_SOLUTION",
    "WINDOWS_ARCH",
    "RUST_LOG",
];

fn packager(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pwa_packager").unwrap();
    for var in CI_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--project-dir").arg(project);
    cmd
}

fn web_app(manifest: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("public")).unwrap();
    std::fs::write(dir.path().join("public/manifest.json"), manifest).unwrap();
    std::fs::write(
        dir.path().join("package.json"),
        r#"{"name":"dating-web-app","version":"2.3.1"}"#,
    )
    .unwrap();
    dir
}

const MANIFEST: &str = r#"{
    "name": "Amora",
    "short_name": "Amora",
    "start_url": "/",
    "display": "standalone",
    "icons": [
        {"src": "/icon-192.png", "sizes": "192x192", "type": "image/png"},
        {"src": "/icon.png", "sizes": "512x512", "type": "image/png"}
    ]
}"#;

#[test]
fn android_manifest_matches_inputs() {
    let app = web_app(MANIFEST);

    packager(app.path())
        .args(["android", "--manifest-only"])
        .env("PWA_BASE_URL", "https://example.com/")
        .env("GITHUB_RUN_NUMBER", "42")
        .assert()
        .success();

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(app.path().join("android/twa-manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["host"], "example.com");
    assert_eq!(manifest["iconUrl"], "https://example.com/icon.png");
    assert_eq!(manifest["appVersionCode"], 42);
    assert_eq!(manifest["appVersion"], "2.3.1");
    assert_eq!(manifest["appVersionName"], "2.3.1");
    assert_eq!(manifest["packageId"], "com.example.twa");
    assert_eq!(manifest["themeColor"], "#000000");
    assert_eq!(manifest["navigationColor"], "#000000");
    assert_eq!(manifest["backgroundColor"], "#FFFFFF");
}

#[test]
fn missing_large_icon_fails_without_writing() {
    let app = web_app(r#"{"name":"Amora","icons":[{"src":"/icon-192.png","sizes":"192x192"}]}"#);

    packager(app.path())
        .args(["android", "--manifest-only"])
        .env("PWA_BASE_URL", "https://example.com/")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("512x512"));

    assert!(!app.path().join("android").exists());
}

#[test]
fn missing_base_url_exits_one() {
    let app = web_app(MANIFEST);

    packager(app.path())
        .args(["ios", "--manifest-only"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PWA_BASE_URL"));

    assert!(!app.path().join("ios").exists());
}

#[test]
fn malformed_package_json_exits_one() {
    let app = web_app(MANIFEST);
    std::fs::write(app.path().join("package.json"), "{ not json").unwrap();

    packager(app.path())
        .args(["windows", "--manifest-only", "--base-url", "https://example.com/"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn windows_version_has_four_parts() {
    let app = web_app(MANIFEST);

    packager(app.path())
        .args(["windows", "--manifest-only"])
        .env("PWA_BASE_URL", "https://example.com/")
        .env("GITHUB_RUN_NUMBER", "42")
        .env("WINDOWS_PUBLISHER", "Amora Labs")
        .assert()
        .success();

    let appx =
        std::fs::read_to_string(app.path().join("windows/Package.appxmanifest")).unwrap();
    assert!(appx.contains(r#"Version="2.3.1.42""#));
    assert!(appx.contains(r#"Publisher="CN=Amora Labs""#));

    let wrapper: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(app.path().join("windows/config.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(wrapper["startUrl"], "https://example.com/");
}

#[test]
fn ios_project_carries_build_number() {
    let app = web_app(MANIFEST);

    packager(app.path())
        .args(["ios", "--manifest-only", "--bundle-id", "com.amora.app"])
        .env("PWA_BASE_URL", "https://example.com/")
        .env("GITHUB_RUN_NUMBER", "7")
        .assert()
        .success();

    let project_yml = std::fs::read_to_string(app.path().join("ios/project.yml")).unwrap();
    assert!(project_yml.contains("PRODUCT_BUNDLE_IDENTIFIER: com.amora.app"));
    let xcconfig = std::fs::read_to_string(app.path().join("ios/Config.xcconfig")).unwrap();
    assert!(xcconfig.contains("MARKETING_VERSION = 2.3.1"));
    assert!(xcconfig.contains("CURRENT_PROJECT_VERSION = 7"));
}

#[test]
fn manifest_only_prints_no_artifacts_as_json() {
    let app = web_app(MANIFEST);

    packager(app.path())
        .args(["--json", "android", "--manifest-only"])
        .env("PWA_BASE_URL", "https://example.com/")
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn usage_errors_exit_one() {
    let app = web_app(MANIFEST);

    packager(app.path()).arg("linux").assert().code(1);
    packager(&app.path().join("missing"))
        .args(["android", "--manifest-only", "--base-url", "https://example.com/"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn help_exits_zero() {
    Command::cargo_bin("pwa_packager")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("android"));
}
