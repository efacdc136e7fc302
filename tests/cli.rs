//! 命令行集成测试
//!
//! 翻译服务地址指向一个不可达的端口，只验证不需要网络的路径与失败处理

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

const UNREACHABLE_API: &str = "http://127.0.0.1:9";

const PAGE: &str = "<!DOCTYPE html><html><head><title>FarmMind</title></head>\
    <body><h1>  Welcome  </h1><input placeholder=\"Search crops\"></body></html>";

fn command(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("farmmind-translate").unwrap();
    cmd.current_dir(workdir)
        .env_remove("FARMMIND_API_BASE_URL")
        .env_remove("FARMMIND_TARGET_LANG")
        .env_remove("FARMMIND_BATCH_SIZE")
        .env_remove("FARMMIND_DEBOUNCE_MS")
        .env_remove("FARMMIND_STATE_FILE")
        .env_remove("FARMMIND_LOG_LEVEL");
    cmd
}

mod passing {
    use super::*;

    #[test]
    fn default_language_passes_page_through() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.html");
        let output = dir.path().join("out.html");
        let state = dir.path().join("state.json");
        fs::write(&input, PAGE).unwrap();

        command(dir.path())
            .arg(&input)
            .args(["--lang", "en", "--api-base", UNREACHABLE_API])
            .arg("--state-file")
            .arg(&state)
            .arg("-o")
            .arg(&output)
            .assert()
            .success();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<h1>  Welcome  </h1>"));
        assert!(html.contains("placeholder=\"Search crops\""));
        assert!(html.contains("<html lang=\"en\">"));
        assert!(!html.contains("fmTranslateWidget"));
        assert!(fs::read_to_string(&state).unwrap().contains("\"en\""));
    }

    #[test]
    fn reads_stdin_and_writes_stdout() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        let assert = command(dir.path())
            .args(["--api-base", UNREACHABLE_API, "--widget"])
            .arg("--state-file")
            .arg(&state)
            .write_stdin(PAGE)
            .assert()
            .success();

        let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
        assert!(stdout.contains("<h1>  Welcome  </h1>"));
        assert!(stdout.contains("id=\"fmTranslateWidget\""));
    }

    #[test]
    fn legacy_charset_is_declared_as_utf8() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");
        // "Café" 的 windows-1252 编码
        let mut page =
            b"<html><head><meta charset=\"windows-1252\"></head><body><p>Caf".to_vec();
        page.push(0xE9);
        page.extend_from_slice(b"</p></body></html>");

        let assert = command(dir.path())
            .args(["--lang", "en", "-E", "windows-1252", "--api-base", UNREACHABLE_API])
            .arg("--state-file")
            .arg(&state)
            .write_stdin(page)
            .assert()
            .success();

        let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
        assert!(stdout.contains("<meta charset=\"utf-8\">"));
        assert!(stdout.contains("<p>Café</p>"));
    }

    #[test]
    fn lists_builtin_languages_when_service_is_down() {
        let dir = TempDir::new().unwrap();

        command(dir.path())
            .args(["--list-languages", "--api-base", UNREACHABLE_API])
            .assert()
            .success()
            .stdout("en\tEN\tEnglish\nhi\tHI\tHindi\n");
    }

    #[test]
    fn prints_environment_docs() {
        let dir = TempDir::new().unwrap();

        let assert = command(dir.path()).arg("--print-env-docs").assert().success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
        assert!(stdout.contains("FARMMIND_API_BASE_URL"));
        assert!(stdout.contains("FARMMIND_TARGET_LANG"));
    }

    #[test]
    fn writes_example_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("farmmind-translate.toml");

        command(dir.path())
            .arg("--write-config")
            .arg(&path)
            .assert()
            .success();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("batch_size = 30"));
    }
}

mod failing {
    use super::*;

    #[test]
    fn unreachable_service_keeps_original_text() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.html");
        let output = dir.path().join("out.html");
        let state = dir.path().join("state.json");
        fs::write(&input, PAGE).unwrap();

        command(dir.path())
            .arg(&input)
            .args(["--lang", "hi", "--api-base", UNREACHABLE_API])
            .arg("--state-file")
            .arg(&state)
            .arg("-o")
            .arg(&output)
            .assert()
            .failure()
            .code(1);

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<h1>  Welcome  </h1>"));
        assert!(!state.exists());
    }

    #[test]
    fn rejects_unknown_encoding() {
        let dir = TempDir::new().unwrap();

        command(dir.path())
            .args(["--encoding", "klingon", "--api-base", UNREACHABLE_API])
            .write_stdin(PAGE)
            .assert()
            .failure();
    }

    #[test]
    fn rejects_zero_batch_size() {
        let dir = TempDir::new().unwrap();

        command(dir.path())
            .args(["--batch-size", "0"])
            .write_stdin(PAGE)
            .assert()
            .failure();
    }
}
