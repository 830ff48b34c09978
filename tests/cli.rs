use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use amber_forge::io::pdb;
use amber_forge::{AtomRecord, Structure};

fn aforge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aforge"))
        .args(args)
        .output()
        .unwrap()
}

fn write_peptide(path: &Path) {
    let mut s = Structure::new();
    let residues = [
        (1, "ALA", &["H1", "N", "CA", "C", "O"][..]),
        (2, "CYS", &["N", "CA", "SG", "C", "O"][..]),
        (3, "CYS", &["N", "CA", "SG", "C", "O", "OXT"][..]),
    ];
    for (resid, resname, names) in residues {
        for name in names {
            s.push(
                AtomRecord::new(*name, resname, resid, "PROA")
                    .element(&name[..1])
                    .position([resid as f64, 1.0, 2.0]),
            );
        }
    }
    let file = fs::File::create(path).unwrap();
    pdb::write(file, &s).unwrap();
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn prepare_writes_capped_pdb_and_prints_bonds() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdb");
    let output = dir.path().join("out.pdb");
    write_peptide(&input);

    let out = aforge(&[
        "prepare",
        "-i",
        path_str(&input),
        "-o",
        path_str(&output),
        "--ss",
        "PROA:2:PROA:3",
        "-q",
    ]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        "bond mol.2.SG mol.3.SG"
    );

    let prepared = pdb::read(std::io::BufReader::new(fs::File::open(&output).unwrap())).unwrap();
    assert_eq!(prepared.residue_names[0], "ACE");
    assert_eq!(prepared.residue_names.last().map(String::as_str), Some("NME"));
    assert_eq!(prepared.residue_names[6], "CYX");
}

#[test]
fn prepare_without_caps_keeps_termini() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdb");
    let output = dir.path().join("out.pdb");
    write_peptide(&input);

    let out = aforge(&[
        "prepare",
        "-i",
        path_str(&input),
        "-o",
        path_str(&output),
        "--no-caps",
        "-q",
    ]);

    assert!(out.status.success());
    let prepared = pdb::read(std::io::BufReader::new(fs::File::open(&output).unwrap())).unwrap();
    assert_eq!(prepared.names[0], "H1");
    assert!(!prepared.residue_names.iter().any(|r| r == "ACE"));
}

#[test]
fn prepare_reports_unknown_segment() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdb");
    write_peptide(&input);

    let out = aforge(&[
        "prepare",
        "-i",
        path_str(&input),
        "-o",
        path_str(&dir.path().join("out.pdb")),
        "--cap",
        "X:ACE:NME",
        "-q",
    ]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no segment 'X'"), "{stderr}");
}

#[test]
fn build_dry_run_writes_script_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdb");
    let outdir = dir.path().join("build");
    let config = dir.path().join("build.toml");
    write_peptide(&input);
    fs::write(
        &config,
        r#"
prefix = "system"
forcefields = ["leaprc.protein.ff14SB"]

[caps]
PROA = ["ACE", ""]

[[disulfides]]
first = { segment_id = "PROA", residue_id = 2 }
second = { segment_id = "PROA", residue_id = 3 }
"#,
    )
    .unwrap();

    let out = aforge(&[
        "build",
        "-i",
        path_str(&input),
        "-d",
        path_str(&outdir),
        "--config",
        path_str(&config),
        "--dry-run",
        "-q",
    ]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let script = fs::read_to_string(outdir.join("tleap.in")).unwrap();
    assert!(script.contains("source leaprc.protein.ff14SB\n"));
    assert!(script.contains("bond mol.2.SG mol.3.SG\n"));
    assert!(script.contains("saveamberparm mol system.prmtop system.crd\n"));

    let written = fs::read_to_string(outdir.join("input.pdb")).unwrap();
    assert!(written.contains("ACE"));
    assert!(!written.contains("NME"));
    assert!(!outdir.join("system.prmtop").exists());
}

#[test]
fn build_fails_cleanly_without_tleap() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdb");
    write_peptide(&input);

    let out = aforge(&[
        "build",
        "-i",
        path_str(&input),
        "-d",
        path_str(&dir.path().join("build")),
        "--tleap",
        "definitely-not-a-real-tleap-binary",
        "-q",
    ]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("definitely-not-a-real-tleap-binary"), "{stderr}");
}

#[test]
fn list_ff_prints_leaprc_files_from_amberhome() {
    let home = tempfile::tempdir().unwrap();
    let cmd_dir = home.path().join("dat").join("leap").join("cmd");
    fs::create_dir_all(&cmd_dir).unwrap();
    fs::write(cmd_dir.join("leaprc.protein.ff14SB"), "").unwrap();
    fs::write(cmd_dir.join("leaprc.lipid21"), "").unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_aforge"))
        .args(["list-ff", "-q"])
        .env("AMBERHOME", home.path())
        .output()
        .unwrap();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let listed: Vec<String> = String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(listed, vec!["leaprc.lipid21", "leaprc.protein.ff14SB"]);
}

#[test]
fn list_ff_requires_amberhome() {
    let out = Command::new(env!("CARGO_BIN_EXE_aforge"))
        .args(["list-ff", "-q"])
        .env_remove("AMBERHOME")
        .output()
        .unwrap();

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("AMBERHOME environment variable is not defined"), "{stderr}");
}
