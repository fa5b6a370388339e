use std::path::PathBuf;

use newsdesk::config::{ConfigFlags, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".newsdeskrc");
    let content = r#"
# comment
--perf

--bucket news-thumbnails

--debug-log=events.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.perf);
    assert_eq!(flags.bucket.as_deref(), Some("news-thumbnails"));
    assert_eq!(flags.debug_log, Some(PathBuf::from("events.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".newsdeskrc");
    let content = "--perf\n--theme InspiredGitHub\n--storage-dir /srv/assets\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "newsdesk".to_string(),
        "render".to_string(),
        "--theme".to_string(),
        "base16-ocean.dark".to_string(),
        "--max-upload-bytes".to_string(),
        "1048576".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.perf, "file flags should remain enabled");
    assert_eq!(effective.max_upload_bytes(), 1_048_576, "cli flags should be applied");
    assert_eq!(
        effective.theme.as_deref(),
        Some("base16-ocean.dark"),
        "cli should override theme"
    );
    assert_eq!(
        effective.storage_dir(),
        PathBuf::from("/srv/assets"),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "newsdesk".to_string(),
        "--public-url=https://cdn.example.com/storage?v=1".to_string(),
        "--debug-log=events.log".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(
        flags.public_url.as_deref(),
        Some("https://cdn.example.com/storage?v=1")
    );
    assert_eq!(flags.debug_log, Some(PathBuf::from("events.log")));
}

#[test]
fn test_local_file_overrides_global_file() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config");
    let local = dir.path().join(".newsdeskrc");
    std::fs::write(&global, "--bucket global-bucket\n--perf\n").unwrap();
    std::fs::write(&local, "--bucket local-bucket\n").unwrap();

    let merged = load_config_flags(&global)
        .unwrap()
        .union(&load_config_flags(&local).unwrap());
    assert_eq!(merged.bucket(), "local-bucket");
    assert!(merged.perf);
}

#[test]
fn test_missing_config_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}
