use vox::intent::Intent;
use vox::kernel::{Capability, CapabilityRegistry, LookupError, RiskLevel};

#[test]
fn test_every_intent_is_registered() {
    let registry = CapabilityRegistry::builtin();

    assert_eq!(registry.len(), Intent::ALL.len());
    for intent in Intent::ALL {
        assert!(registry.get_capability(intent).is_ok(), "{intent} missing");
    }
}

#[test]
fn test_unknown_is_never_executable() {
    let registry = CapabilityRegistry::builtin();

    assert!(!registry.validate_capability(Intent::Unknown));
    let cap = registry.get_capability(Intent::Unknown).unwrap();
    assert!(!cap.executable);
}

#[test]
fn test_every_actionable_intent_is_executable() {
    let registry = CapabilityRegistry::builtin();
    for intent in Intent::actionable() {
        assert!(registry.validate_capability(intent), "{intent} should be executable");
    }
}

#[test]
fn test_close_app_is_high_risk_and_flagged() {
    let registry = CapabilityRegistry::builtin();
    let cap = registry.get_capability(Intent::CloseApp).unwrap();

    assert_eq!(cap.risk, RiskLevel::High);
    assert!(cap.requires_confirmation);
    assert!(registry.requires_confirmation(Intent::CloseApp));
    assert!(!registry.requires_confirmation(Intent::OpenApp));
}

#[test]
fn test_app_allowlists() {
    let registry = CapabilityRegistry::builtin();

    assert_eq!(registry.executable_for("chrome"), Some("google-chrome"));
    assert_eq!(registry.executable_for("vscode"), Some("code"));
    assert_eq!(registry.executable_for("browser"), Some("firefox"));
    assert_eq!(registry.executable_for("spotify"), None, "Known but not allowlisted");

    assert_eq!(registry.process_for("terminal"), Some("gnome-terminal"));
    assert_eq!(registry.process_for("slack"), None);
}

#[test]
fn test_unregistered_intent_lookups() {
    let registry = CapabilityRegistry::from_entries([(
        Intent::Greeting,
        Capability::new(RiskLevel::Low, "greet"),
    )]);

    assert!(!registry.validate_capability(Intent::Exit));
    assert!(!registry.requires_confirmation(Intent::Exit));
    assert_eq!(
        registry.get_capability(Intent::Exit).unwrap_err(),
        LookupError(Intent::Exit)
    );
    assert_eq!(registry.executable_for("firefox"), None);
}

#[test]
fn test_risk_ordering() {
    assert!(RiskLevel::Low < RiskLevel::Medium);
    assert!(RiskLevel::High < RiskLevel::Critical);
}
