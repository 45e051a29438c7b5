// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use soapbox_stage::*;

// Core state machine and meter
mod cringe_meter_tests;


// Archive and command line surface
mod cli_argument_parsing_tests;

#[test]
fn test_core_id_types() {
    let user_id = UserId::new();
    let session_id = SessionId::new();
    let reaction_id = ReactionId::new();
    let rant_id = RantId::new();

    // Test that IDs are unique
    assert_ne!(user_id, UserId::new());
    assert_ne!(session_id, SessionId::new());
    assert_ne!(reaction_id, ReactionId::new());
    assert_ne!(rant_id, RantId::new());

    // The example speaker has a fixed identity
    assert!(UserId::example_speaker().is_example_speaker());
    assert!(!user_id.is_example_speaker());
}

#[test]
fn test_enum_types() {
    for emoji in &Emoji::ALL {
        assert!(!emoji.to_string().is_empty());
    }

    let phases = [
        StagePhase::Idle,
        StagePhase::ExampleDemo,
        StagePhase::UserSpeaking,
        StagePhase::Ejected,
        StagePhase::Completed,
    ];
    for phase in &phases {
        assert!(!phase.to_string().is_empty());
    }

    for sort in [RantSort::Recent, RantSort::Popular, RantSort::Longest, RantSort::Controversial] {
        assert_eq!(sort.to_string().parse::<RantSort>().unwrap(), sort);
    }
}

#[test]
fn test_serialization_roundtrip() {
    let user_id = UserId::new();
    let json = serde_json::to_string(&user_id).unwrap();
    let deserialized: UserId = serde_json::from_str(&json).unwrap();
    assert_eq!(user_id, deserialized);

    let reaction = Reaction::new(user_id, SessionId::new(), Emoji::Explain, chrono::Utc::now());
    let json = serde_json::to_string(&reaction).unwrap();
    assert!(json.contains("\"explain\""));
    let deserialized: Reaction = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, reaction);
}

#[test]
fn test_statistics_report_after_run() {
    let config = StageConfig { seed: Some(3), ..Default::default() };
    let user = User::new("ReportReader", chrono::Utc::now());
    let mut stage =
        StageController::mount(config, user, LocalStore::in_memory(), StageCollaborators::headless()).unwrap();

    stage.advance_by(std::time::Duration::from_secs(60));
    stage.teardown();

    let report = stage.statistics().generate_summary_report();
    assert!(report.contains("Soapbox Stage Closed"));
    assert!(report.contains("Simulated Time: 60 seconds"));
}
