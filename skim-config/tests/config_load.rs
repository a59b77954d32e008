use serial_test::serial;
use skim_config::SkimConfigLoader;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_and_env_placeholders() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
version: "0.1"
browser:
  webdriver_url: "${SKIM_TEST_GRID}"
  headless: true
session:
  max_pages: 4
cards:
  tab_text: "Stories"
  schema:
    card: "li.result"
    fields:
      - name: title
        candidates:
          - css: "h2"
      - name: link
        candidates:
          - css: "a"
        value:
          attr_or_text: "href"
"#;
    let p = write_yaml(&tmp, "skim.yaml", file_yaml);

    temp_env::with_var("SKIM_TEST_GRID", Some("http://grid:4444"), || {
        let config = SkimConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config");

        assert_eq!(config.browser.webdriver_url, "http://grid:4444");
        assert!(config.browser.headless);
        assert_eq!(config.session.max_pages, 4);
        assert_eq!(config.session.max_settle_attempts, 10);
        assert_eq!(config.cards.tab_text.as_deref(), Some("Stories"));

        let schema = config.cards.schema();
        assert_eq!(schema.card, "li.result");
        assert_eq!(schema.columns(), vec!["title", "link"]);
    });
}

#[test]
#[serial]
fn env_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "skim.yaml", "session:\n  max_pages: 4\n");

    temp_env::with_var("SKIM_SESSION__MAX_PAGES", Some("2"), || {
        let config = SkimConfigLoader::new().with_file(&p).load().unwrap();
        assert_eq!(config.session.max_pages, 2);
    });
}

#[test]
#[serial]
fn env_overrides_inline_yaml_but_file_values_survive() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "skim.yaml",
        "session:\n  max_pages: 4\npagination:\n  page_param: p\n",
    );

    temp_env::with_var("SKIM_SESSION__MAX_PAGES", Some("3"), || {
        let config = SkimConfigLoader::new()
            .with_file(&p)
            .with_yaml_str("session:\n  max_pages: 9\n")
            .load()
            .unwrap();
        assert_eq!(config.session.max_pages, 3);
        assert_eq!(config.pagination.page_param, "p");
    });
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = SkimConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");

    assert_eq!(config.pagination.page_param, "page");
    assert_eq!(config.cards.search_url, "https://medium.com/search");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = SkimConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}
