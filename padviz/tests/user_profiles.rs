mod support;

use std::rc::Rc;

use padviz::prelude::*;
use support::{Rig, firefox_pad};

#[test]
fn every_known_profile_has_a_default_with_exactly_its_options() {
    let store = UserProfileStore::new(Rc::new(MemoryStore::new()));

    for profile in VisualizationProfile::ALL {
        let default = store
            .default_profile(profile)
            .expect("default user profile");
        let mut keys: Vec<&str> =
            default.options().keys().map(String::as_str).collect();
        let mut declared: Vec<&str> =
            profile.options().iter().map(|d| d.id).collect();
        keys.sort();
        declared.sort();
        assert_eq!(keys, declared, "{}", profile);
    }
}

#[test]
fn upsert_then_lookup_is_value_equal_and_idempotent() {
    let backend = Rc::new(MemoryStore::new());
    let mut store = UserProfileStore::new(backend.clone());
    let profile = VisualizationProfile::XboxChromium;

    let mut custom = profile.default_user_profile();
    custom.set_profile_name("Tournament");
    custom.set("colorPressed", OptionValue::from("#00FF00"));

    assert!(store.add_or_update(profile, custom.clone()));
    assert_eq!(store.user_profile(profile, "Tournament"), Some(&custom));
    assert!(!store.add_or_update(profile, custom.clone()));

    // durable on return
    let reloaded = UserProfileStore::load(backend);
    assert_eq!(reloaded.user_profile(profile, "Tournament"), Some(&custom));
}

#[test]
fn export_then_import_round_trips() {
    let mut rig = Rig::new();
    rig.source.plug(firefox_pad(0));
    rig.warm_up();

    rig.app
        .set_option(0, "colorBody", OptionValue::from("#202020"))
        .expect("set option");
    rig.app
        .set_option(0, "title", OptionValue::from("Left Hand"))
        .expect("set option");

    let entry = rig.app.registry().get(0).expect("device");
    let visualization = entry.visualization;
    let original = entry.user_profile(rig.app.store()).into_owned();

    let export = rig.app.export_user_profile(0).expect("export");
    let json = export.to_pretty_json().expect("serialize");

    // a fresh process importing the downloaded file
    let mut fresh = Rig::new();
    fresh.source.plug(firefox_pad(0));
    fresh.warm_up();

    let mut slot = ImportSlot::new();
    slot.stage_str(&json);
    fresh.app.commit_import(0, &mut slot).expect("import");

    let entry = fresh.app.registry().get(0).expect("device");
    let imported = entry.user_profile(fresh.app.store()).into_owned();
    assert_eq!(entry.visualization, visualization);
    assert_eq!(imported, original);
    assert!(imported.get("gamepadId").is_none());
    assert!(imported.get("visualizationProfile").is_none());
}

#[test]
fn file_store_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let profile = VisualizationProfile::Unknown;

    {
        let backend = Rc::new(FileStore::new(dir.path()));
        let mut store = UserProfileStore::load(backend);
        let mut custom = profile.default_user_profile();
        custom.set_profile_name("Arcade");
        store.add_or_update(profile, custom);
    }

    let store = UserProfileStore::load(Rc::new(FileStore::new(dir.path())));
    assert_eq!(
        store.last_used(profile).map(|p| p.profile_name()),
        Some("Arcade")
    );
}
