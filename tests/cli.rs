use std::{
    path::Path,
    process::{Command, Output, Stdio},
    thread,
    time::{Duration, Instant},
};

use dio_loop::RawFile;

fn direct_read(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_direct-read"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .unwrap()
}

fn sync_write(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sync-write"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn mode_args(path: &Path) -> Vec<&'static str> {
    match RawFile::open_read(path, true) {
        Ok(_) => vec![],
        Err(_) => vec!["--buffered"],
    }
}

#[test]
fn direct_read_completes_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data");
    std::fs::write(&path, vec![b'x'; 4096]).unwrap();
    let path_str = path.to_str().unwrap();

    let mut args = vec!["--path", path_str];
    args.extend(mode_args(&path));
    let out = direct_read(&args);

    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("read loop finished"));
}

#[test]
fn direct_read_accepts_short_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short");
    std::fs::write(&path, b"tiny").unwrap();
    let path_str = path.to_str().unwrap();

    let mut args = vec!["--path", path_str, "--iterations", "100"];
    args.extend(mode_args(&path));
    let out = direct_read(&args);

    assert!(out.status.success(), "{}", stderr(&out));
}

#[test]
fn direct_read_missing_file_fails_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing");

    let out = direct_read(&["--path", path.to_str().unwrap()]);

    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("open"), "{err}");
    assert!(!err.contains("starting read loop"), "{err}");
}

#[test]
fn direct_read_rejects_bad_alignment() {
    let out = direct_read(&["--alignment", "100"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid configuration"));
}

#[test]
fn sync_write_creates_file_with_single_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test");

    let out = sync_write(&["--path", path.to_str().unwrap(), "--iterations", "25"]);

    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(std::fs::read(&path).unwrap(), b"This is my message\n");
}

#[test]
fn sync_write_custom_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test");

    let out = sync_write(&[
        "--path",
        path.to_str().unwrap(),
        "--iterations",
        "3",
        "--message",
        "hello",
    ]);

    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(std::fs::read(&path).unwrap(), b"hello");
}

#[test]
fn sync_write_open_failure_halts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent-dir").join("test");

    let out = sync_write(&["--path", path.to_str().unwrap()]);

    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("open"), "{err}");
    assert!(!err.contains("starting write loop"), "{err}");
    assert!(!path.exists());
}

#[test]
fn sync_write_failure_halts() {
    let out = sync_write(&["--path", "/dev/full", "--iterations", "1"]);

    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("write (iteration 0)"), "{err}");
}

#[test]
fn sync_write_interrupt_cuts_delay_short() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test");

    let child = Command::new(env!("CARGO_BIN_EXE_sync-write"))
        .args(["--path", path.to_str().unwrap(), "--delay-ms", "60000"])
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(30);
    while std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0) < 19 {
        assert!(Instant::now() < deadline, "sync-write never wrote");
        thread::sleep(Duration::from_millis(5));
    }
    // Let the runtime reach its signal listener.
    thread::sleep(Duration::from_millis(300));

    let interrupted = Instant::now();
    let rt = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGINT) };
    assert_eq!(rt, 0);
    let out = child.wait_with_output().unwrap();

    assert!(out.status.success(), "{}", stderr(&out));
    assert!(interrupted.elapsed() < Duration::from_secs(20));
    assert!(stderr(&out).contains("write loop cancelled"));
    assert_eq!(std::fs::read(&path).unwrap(), b"This is my message\n");
}
