//! Integration tests for config template bootstrap
//!
//! Covers rendering with prompts and user data, the written file, and how the
//! template fingerprint is recorded, replaced and deleted.

mod common;

use common::*;
use dotkeep_core::state::{CONFIG_STATE_BUCKET, CONFIG_STATE_KEY};
use dotkeep_core::{ConfigFormat, JsonFileState, PersistentState};
use dotkeep_init::templates::{template_data, ConfigBootstrapper, TemplateFunctions};
use dotkeep_init::Error;
use serde_json::json;
use sha2::{Digest, Sha256};

const TOML_TEMPLATE: &str = r#"[data]
email = "{{ prompt_string(field="email") }}"
work = {{ prompt_bool(field="work") }}
"#;

fn bootstrap(
    env: &TestEnv,
    state: &dyn PersistentState,
    answers: &str,
) -> dotkeep_init::Result<Option<dotkeep_init::RenderedConfig>> {
    let config = env.config();
    let functions = TemplateFunctions::standard(&config.source_dir, scripted_prompter(answers));
    let data = template_data(&config, env.config_dir(), "0.0.0-test");
    ConfigBootstrapper::new(env.config_dir(), state, functions, data).bootstrap(&config.source_dir)
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[test]
fn test_renders_template_with_prompts() {
    let env = TestEnv::new();
    env.init_source();
    env.write_source(".dotkeep.toml.tmpl", TOML_TEMPLATE);
    let state = MemoryState::new();

    let rendered = bootstrap(&env, &state, "alice@example.com\nno\n")
        .unwrap()
        .expect("config should be rendered");

    assert_eq!(rendered.format, ConfigFormat::Toml);
    assert_eq!(rendered.path, env.config_dir().join("dotkeep.toml"));
    assert_eq!(
        rendered.contents,
        "[data]\nemail = \"alice@example.com\"\nwork = false\n"
    );
    assert_eq!(std::fs::read_to_string(&rendered.path).unwrap(), rendered.contents);
    assert_eq!(
        stored_fingerprint(&state),
        Some(sha256_hex(TOML_TEMPLATE.as_bytes()))
    );
}

#[test]
fn test_renders_default_and_user_data() {
    let env = TestEnv::new();
    env.init_source();
    env.write_source(
        ".dotkeep.yaml.tmpl",
        "os: {{ dotkeep.os }}\nsource: {{ dotkeep.source_dir }}\n",
    );
    let state = MemoryState::new();

    let rendered = bootstrap(&env, &state, "").unwrap().unwrap();

    assert_eq!(rendered.format, ConfigFormat::Yaml);
    assert_eq!(rendered.path, env.config_dir().join("dotkeep.yaml"));
    assert_eq!(
        rendered.contents,
        format!(
            "os: {}\nsource: {}\n",
            std::env::consts::OS,
            env.source_dir()
        )
    );
}

#[test]
fn test_fingerprint_stable_across_runs() {
    let env = TestEnv::new();
    env.init_source();
    env.write_source(".dotkeep.toml.tmpl", TOML_TEMPLATE);
    let state = MemoryState::new();

    bootstrap(&env, &state, "a@example.com\nyes\n").unwrap();
    let first = stored_fingerprint(&state).unwrap();

    // Different answers change the output but not the template source
    bootstrap(&env, &state, "b@example.com\nno\n").unwrap();
    let second = stored_fingerprint(&state).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_fingerprint_changes_with_one_byte() {
    let env = TestEnv::new();
    env.init_source();
    env.write_source(".dotkeep.json.tmpl", "{\"a\": 1}\n");
    let state = MemoryState::new();

    bootstrap(&env, &state, "").unwrap();
    let before = stored_fingerprint(&state).unwrap();

    env.write_source(".dotkeep.json.tmpl", "{\"a\": 2}\n");
    bootstrap(&env, &state, "").unwrap();
    let after = stored_fingerprint(&state).unwrap();

    assert_ne!(before, after);
}

#[test]
fn test_no_template_deletes_fingerprint() {
    let env = TestEnv::new();
    env.init_source();
    let state = MemoryState::new().with_value(
        CONFIG_STATE_BUCKET,
        CONFIG_STATE_KEY,
        json!({"configTemplateContentsSHA256": "00"}),
    );

    let rendered = bootstrap(&env, &state, "").unwrap();

    assert!(rendered.is_none());
    assert!(stored_fingerprint(&state).is_none());
    assert!(!env.config_dir().join("dotkeep.toml").exists());
}

#[cfg(unix)]
#[test]
fn test_unreadable_template_keeps_fingerprint() {
    let env = TestEnv::new();
    let source = env.init_source();
    let template = source.join(".dotkeep.toml.tmpl");
    std::os::unix::fs::symlink(&template, &template).unwrap();
    let state = MemoryState::new().with_value(
        CONFIG_STATE_BUCKET,
        CONFIG_STATE_KEY,
        json!({"configTemplateContentsSHA256": "00"}),
    );

    let err = bootstrap(&env, &state, "").unwrap_err();

    assert!(matches!(err, Error::Io(_)), "unexpected error: {err}");
    assert_eq!(stored_fingerprint(&state).as_deref(), Some("00"));
}

#[test]
fn test_invalid_int_aborts_without_writing() {
    let env = TestEnv::new();
    env.init_source();
    env.write_source(".dotkeep.toml.tmpl", "age = {{ prompt_int(field=\"age\") }}\n");
    let previous = json!({"configTemplateContentsSHA256": "previous"});
    let state =
        MemoryState::new().with_value(CONFIG_STATE_BUCKET, CONFIG_STATE_KEY, previous.clone());

    let err = bootstrap(&env, &state, "banana\n").unwrap_err();

    assert!(matches!(err, Error::TemplateRender { .. }));
    assert!(err.to_string().contains("banana"), "error was: {err}");
    assert!(!env.config_dir().join("dotkeep.toml").exists());
    assert_eq!(
        state.get(CONFIG_STATE_BUCKET, CONFIG_STATE_KEY).unwrap(),
        Some(previous)
    );
}

#[test]
fn test_parse_error_writes_nothing() {
    let env = TestEnv::new();
    env.init_source();
    env.write_source(".dotkeep.toml.tmpl", "broken = {{ unclosed\n");
    let state = MemoryState::new();

    let err = bootstrap(&env, &state, "").unwrap_err();

    assert!(matches!(err, Error::TemplateParse { .. }));
    assert!(!env.config_dir().exists());
    assert!(stored_fingerprint(&state).is_none());
}

#[test]
fn test_multiple_templates_is_error() {
    let env = TestEnv::new();
    env.init_source();
    env.write_source(".dotkeep.toml.tmpl", "");
    env.write_source(".dotkeep.yaml.tmpl", "");
    let state = MemoryState::new();

    let err = bootstrap(&env, &state, "").unwrap_err();

    assert!(matches!(err, Error::MultipleConfigTemplates { .. }));
}

#[test]
fn test_fingerprint_persisted_in_state_file() {
    let env = TestEnv::new();
    env.init_source();
    env.write_source(".dotkeep.json.tmpl", "{}\n");
    let state = JsonFileState::new(env.dirs.state_file());

    bootstrap(&env, &state, "").unwrap();

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(env.dirs.state_file()).unwrap()).unwrap();
    assert_eq!(
        document[CONFIG_STATE_BUCKET][CONFIG_STATE_KEY]["configTemplateContentsSHA256"],
        sha256_hex(b"{}\n")
    );
}
