#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Compiled-unit bytes referencing the given marker descriptor.
pub fn class_bytes(marker: Option<&str>) -> Vec<u8> {
    let mut bytes = b"\xCA\xFE\xBA\xBE\x00\x00\x00\x34".to_vec();
    bytes.extend_from_slice(b"\x01\x00\x10java/lang/Object");
    if let Some(marker) = marker {
        let descriptor = format!("L{};", marker.replace('.', "/"));
        bytes.push(0x01);
        bytes.extend_from_slice(&(descriptor.len() as u16).to_be_bytes());
        bytes.extend_from_slice(descriptor.as_bytes());
    }
    bytes
}

pub const ENTITY: &str = "javax.persistence.Entity";
pub const EMBEDDABLE: &str = "javax.persistence.Embeddable";

/// Members of the `defaultpar` unit: three types (two marked), two mapping
/// resources and an unrelated descriptor.
pub fn defaultpar_members() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("META-INF/persistence.xml", b"<persistence/>".to_vec()),
        ("META-INF/orm.xml", b"<entity-mappings/>".to_vec()),
        ("org/acme/defaultpar/Lighter.class", class_bytes(Some(ENTITY))),
        ("org/acme/defaultpar/Money.class", class_bytes(Some(EMBEDDABLE))),
        ("org/acme/defaultpar/Helper.class", class_bytes(None)),
        ("org/acme/defaultpar/Mouse.hbm.xml", b"<hibernate-mapping/>".to_vec()),
    ]
}

/// Zip the given members into memory.
pub fn zip_bytes<B: AsRef<[u8]>>(members: &[(&str, B)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, body) in members {
        if let Some(dir) = name.strip_suffix('/') {
            writer.add_directory(format!("{dir}/"), options).unwrap();
            continue;
        }
        writer.start_file(*name, options).unwrap();
        writer.write_all(body.as_ref()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Lay the given members out as files under `root`.
pub fn explode<B: AsRef<[u8]>>(root: &Path, members: &[(&str, B)]) {
    for (name, body) in members {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body.as_ref()).unwrap();
    }
}

/// Temporary directory holding test packages.
pub struct Packages {
    pub dir: TempDir,
}

impl Packages {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write an archive and return its locator.
    pub fn archive<B: AsRef<[u8]>>(&self, name: &str, members: &[(&str, B)]) -> String {
        let path = self.path(name);
        fs::write(&path, zip_bytes(members)).unwrap();
        path.display().to_string()
    }

    /// Write an exploded unit and return its locator.
    pub fn exploded<B: AsRef<[u8]>>(&self, name: &str, members: &[(&str, B)]) -> String {
        let path = self.path(name);
        fs::create_dir_all(&path).unwrap();
        explode(&path, members);
        path.display().to_string()
    }

    /// `defaultpar.par` as a standalone archive.
    pub fn defaultpar(&self) -> String {
        self.archive("defaultpar.par", &defaultpar_members())
    }

    /// `nestedjar.ear` containing `defaultpar.par` at its root.
    pub fn nestedjar(&self) -> String {
        let inner = zip_bytes(&defaultpar_members());
        self.archive(
            "nestedjar.ear",
            &[
                ("META-INF/application.xml", b"<application/>".to_vec()),
                ("defaultpar.par", inner),
            ],
        )
    }

    /// `war.war` with persistence classes under `WEB-INF/classes`.
    pub fn war(&self) -> String {
        let classes: Vec<(String, Vec<u8>)> = defaultpar_members()
            .into_iter()
            .map(|(name, body)| (format!("WEB-INF/classes/{name}"), body))
            .collect();
        let mut members: Vec<(&str, Vec<u8>)> = vec![
            ("WEB-INF/", Vec::new()),
            ("WEB-INF/web.xml", b"<web-app/>".to_vec()),
            ("index.html", b"<html/>".to_vec()),
            ("Stray.class", class_bytes(Some(ENTITY))),
        ];
        members.extend(classes.iter().map(|(n, b)| (n.as_str(), b.clone())));
        self.archive("war.war", &members)
    }
}

/// Sorted names in one result set.
pub fn names(set: &std::collections::BTreeSet<jarscan_core::Entry>) -> Vec<String> {
    set.iter().map(|e| e.name().to_string()).collect()
}
