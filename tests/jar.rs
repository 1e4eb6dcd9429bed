use modforge::emit::EmittedClass;
use modforge::jar::{JarFile, JarManifest, ModArchive, ModDescriptor};

fn sample_archive() -> ModArchive {
    let mut archive = ModArchive::new("examplemod", "1.0.0", "1.21.1");
    archive.set_entrypoint("demo.Main");
    archive.add_class(EmittedClass {
        name: "demo/Main".to_string(),
        bytes: vec![0xCA, 0xFE, 0xBA, 0xBE],
    });
    archive
}

#[test]
fn archive_lays_out_the_expected_entries() {
    let jar = sample_archive().to_jar().unwrap();
    assert!(jar.contains_entry("META-INF/MANIFEST.MF"));
    assert!(jar.contains_entry("fabric.mod.json"));
    assert!(jar.contains_entry("demo/Main.class"));
    assert_eq!(jar.class_names().count(), 1);
}

#[test]
fn manifest_carries_the_loader_attributes() {
    let jar = sample_archive().to_jar().unwrap();
    let manifest = jar.manifest().unwrap().expect("manifest present");
    assert_eq!(manifest.get("Manifest-Version"), Some("1.0"));
    assert_eq!(manifest.get("Fabric-Jar-Type"), Some("classes"));
    assert_eq!(manifest.get("Fabric-Minecraft-Version"), Some("1.21.1"));
}

#[test]
fn descriptor_serializes_the_loader_schema() {
    let jar = sample_archive().to_jar().unwrap();
    let raw = jar.get_entry("fabric.mod.json").unwrap();

    let value: serde_json::Value = serde_json::from_slice(raw).unwrap();
    assert_eq!(value["schemaVersion"], 1);
    assert_eq!(value["id"], "examplemod");
    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["entrypoints"]["main"][0], "demo.Main");

    let parsed: ModDescriptor = serde_json::from_slice(raw).unwrap();
    assert_eq!(parsed, sample_archive().descriptor());
}

#[test]
fn missing_entrypoint_leaves_main_empty() {
    let archive = ModArchive::new("examplemod", "1.0.0", "1.21.1");
    assert!(archive.descriptor().entrypoints.main.is_empty());
}

#[test]
fn jar_name_embeds_id_and_versions() {
    assert_eq!(sample_archive().jar_name(), "examplemod-v1.0.0-1.21.1.jar");
}

#[test]
fn archive_bytes_round_trip() {
    let archive = sample_archive();
    let bytes = archive.to_bytes().unwrap();
    let jar = JarFile::from_bytes(&bytes).unwrap();
    assert_eq!(jar.get_entry("demo/Main.class"), Some(&[0xCA, 0xFE, 0xBA, 0xBE][..]));
    assert_eq!(
        jar.entry_names().collect::<Vec<_>>(),
        vec!["META-INF/MANIFEST.MF", "demo/Main.class", "fabric.mod.json"]
    );
}

#[test]
fn extra_resources_are_bundled() {
    let mut archive = sample_archive();
    archive.add_resource("assets/examplemod/icon.png", vec![1, 2, 3]);
    let jar = archive.to_jar().unwrap();
    assert_eq!(jar.get_entry("assets/examplemod/icon.png"), Some(&[1, 2, 3][..]));
}

#[test]
fn manifest_round_trips_through_bytes() {
    let mut manifest = JarManifest::versioned();
    manifest.set("Fabric-Jar-Type", "classes");
    let parsed = JarManifest::parse(&manifest.to_bytes()).unwrap();
    assert_eq!(parsed, manifest);
}

#[test]
fn long_manifest_values_wrap_and_rejoin() {
    let mut manifest = JarManifest::new();
    let long = "x".repeat(200);
    manifest.set("Long-Attribute", &long);

    let bytes = manifest.to_bytes();
    for line in std::str::from_utf8(&bytes).unwrap().split("\r\n") {
        assert!(line.len() <= 72, "line over 72 bytes: {line:?}");
    }

    let parsed = JarManifest::parse(&bytes).unwrap();
    assert_eq!(parsed.get("Long-Attribute"), Some(long.as_str()));
}

#[test]
fn manifest_lookup_is_case_insensitive() {
    let mut manifest = JarManifest::new();
    manifest.set("Fabric-Jar-Type", "classes");
    assert_eq!(manifest.get("fabric-jar-type"), Some("classes"));
    manifest.set("FABRIC-JAR-TYPE", "sources");
    assert_eq!(manifest.get("Fabric-Jar-Type"), Some("sources"));
}
