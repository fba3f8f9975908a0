use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use serde_json::{json, Value};

fn jadwal(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jadwal"))
        .args(args)
        .output()
        .unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_cluster_csv_to_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cities.csv");
    let output = dir.path().join("clustered.json");
    fs::write(&input, "city,n\nNew York,1\nnew york,2\nBoston,3\n,4\n").unwrap();

    let out = jadwal(&[
        "cluster",
        "--input", path_str(&input),
        "--col", "city",
        "--output", path_str(&output),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        written,
        json!([
            {"city": "New York", "city (clustered)": "New York", "n": 1},
            {"city": "new york", "city (clustered)": "New York", "n": 2},
            {"city": "Boston", "city (clustered)": "Boston", "n": 3},
            {"city": null, "city (clustered)": null, "n": 4},
        ])
    );
}

#[test]
fn test_append_json_to_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let left = dir.path().join("a.json");
    let right = dir.path().join("b.json");
    let output = dir.path().join("appended.csv");
    fs::write(&left, r#"[{"id": 1, "name": "x"}]"#).unwrap();
    fs::write(&right, r#"[{"id": 2, "name": null}]"#).unwrap();

    let out = jadwal(&[
        "append",
        "--left", path_str(&left),
        "--right", path_str(&right),
        "--append-type", "vertical",
        "--output", path_str(&output),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(&output).unwrap(), "id,name\n1,x\n2,\n");
}

#[test]
fn test_join_writes_csv_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let left = dir.path().join("left.json");
    let right = dir.path().join("right.csv");
    fs::write(&left, r#"[{"id": 1, "x": "a"}, {"id": 2, "x": "b"}]"#).unwrap();
    fs::write(&right, "key,y\n1,c\n").unwrap();

    let out = jadwal(&[
        "join",
        "--left", path_str(&left),
        "--right", path_str(&right),
        "--join-col-1", "id",
        "--join-col-2", "key",
        "--join-type", "left",
        "--format", "csv",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "id,x,y\n1,a,c\n2,b,\n");
}

#[test]
fn test_missing_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("t.json");
    fs::write(&input, r#"[{"a": 1}]"#).unwrap();

    let out = jadwal(&["cluster", "--input", path_str(&input), "--col", "b"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());

    let out = jadwal(&["append", "--left", path_str(&input), "--right", path_str(&input), "--append-type", "diagonal"]);
    assert!(!out.status.success());
}
