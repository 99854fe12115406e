use std::fs;
use std::path::PathBuf;

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

#[test]
fn every_demo_source_assembles_to_its_listing() {
    let mut checked = 0;
    for entry in fs::read_dir(demos_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("asm") {
            continue;
        }
        let source = fs::read_to_string(&path).unwrap();
        let listing = fs::read_to_string(path.with_extension("ls8")).unwrap();

        let assembled = ls8_asm::assemble(&source).unwrap();
        let expected = ls8_loader::parse_listing(&listing).unwrap();
        assert_eq!(assembled, expected, "{}", path.display());
        checked += 1;
    }
    assert!(checked >= 7, "only {checked} demos found");
}

#[test]
fn listing_output_reloads_to_the_same_bytes() {
    let source = fs::read_to_string(demos_dir().join("call.asm")).unwrap();
    let bytes = ls8_asm::assemble(&source).unwrap();
    let reloaded = ls8_loader::parse_listing(&ls8_asm::to_listing(&bytes)).unwrap();
    assert_eq!(reloaded, bytes);
}
