//! Vendor registry behaviour seen from outside the crate.

use std::sync::Arc;

use sqlsplit::{
    BlockEnd, ConcurrentFileParser, Error, Splitter, Vendor, VendorClassifier,
    VendorRegistry,
};

/// A vendor written by a downstream crate: `@` lines end `CREATE MODULE` blocks.
struct ModuleVendor;

impl VendorClassifier for ModuleVendor {
    fn name(&self) -> &str {
        "modules"
    }

    fn is_procedural_start(&self, text: &str) -> bool {
        text.get(..13)
            .is_some_and(|head| head.eq_ignore_ascii_case("CREATE MODULE"))
    }

    fn block_end(&self) -> BlockEnd<'_> {
        BlockEnd::Line("@")
    }
}

#[test]
fn every_builtin_is_supported() {
    let registry = VendorRegistry::builtin();

    for vendor in Vendor::ALL {
        assert!(registry.contains(vendor.as_str()), "{vendor} missing");
        let upper = vendor.as_str().to_uppercase();
        assert_eq!(registry.get(&upper).expect("case-insensitive").name(), vendor.as_str());
    }
}

#[test]
fn unsupported_vendor_message_lists_known_names() {
    let err = VendorRegistry::builtin()
        .get("db2")
        .expect_err("db2 is not built in");

    assert_eq!(
        err.to_string(),
        "unsupported database vendor: 'db2' (known: mysql, oracle, postgresql, sqlserver)"
    );
}

#[test]
fn downstream_vendor_plugs_into_the_splitter() {
    let mut registry = VendorRegistry::with_builtins();
    assert!(registry.register("Modules", Arc::new(ModuleVendor)).is_none());

    let vendor = registry.get("modules").expect("registered");
    let script = Splitter::new(vendor.as_ref())
        .split("CREATE MODULE m;\n  x = 1;\n@\nSELECT 1;\n")
        .expect("split");

    assert_eq!(script.len(), 2);
    assert_eq!(script.procedural_count(), 1);
    assert_eq!(script.statements()[0].text(), "CREATE MODULE m;\n  x = 1;");
    assert_eq!(registry.names().len(), 5);
}

#[test]
fn unknown_vendor_fails_before_any_job_exists() {
    let err = ConcurrentFileParser::for_vendor(VendorRegistry::builtin(), "nonexistent")
        .expect_err("unknown vendor");

    assert!(matches!(err, Error::UnsupportedVendor { ref name, .. } if name == "nonexistent"));
}
