//! Record controllers driven against the in-memory store.

use recordgate::domain::model::Fields;
use recordgate::{
    AccountController, ErrorKind, FlashLevel, ItemResource, MemoryAuth, MemoryStore, Outcome,
    Payload, RecordController, RemoteAuth, RemoteStore, Target, UserResource,
};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

fn fields(value: JsonValue) -> Fields {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

fn items(store: &Arc<MemoryStore>) -> RecordController<ItemResource> {
    RecordController::new(store.clone(), ItemResource::default())
}

fn users(store: &Arc<MemoryStore>) -> RecordController<UserResource> {
    RecordController::new(store.clone(), UserResource::default())
}

fn flash_of(outcome: &Outcome) -> (FlashLevel, String) {
    let flash = outcome.flash().expect("expected a redirect");
    (flash.level, flash.message.clone().unwrap_or_default())
}

#[tokio::test]
async fn create_item_stamps_equal_timestamps() {
    let store = Arc::new(MemoryStore::new());
    let controller = items(&store);

    let outcome = controller
        .submit_create(&fields(json!({"name": "Widget", "description": "A small widget"})))
        .await;
    assert_eq!(
        flash_of(&outcome),
        (FlashLevel::Success, "Item created successfully.".to_string())
    );
    assert!(matches!(&outcome, Outcome::Redirect(r) if r.target == Target::Index));

    let rows = store.list_all("items").await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get_str("name"), Some("Widget"));
    assert!(row.get_str("created_at").is_some());
    assert_eq!(row.get_str("created_at"), row.get_str("updated_at"));
}

#[tokio::test]
async fn update_keeps_created_at_and_advances_updated_at() {
    let store = Arc::new(MemoryStore::new());
    let controller = items(&store);
    controller
        .submit_create(&fields(json!({"name": "Widget", "description": "A small widget"})))
        .await;
    let before = store.list_all("items").await.unwrap().remove(0);
    let id = before.id().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let outcome = controller
        .submit_update(&id, &fields(json!({"name": "Gadget", "description": "Renamed"})))
        .await;
    assert_eq!(
        flash_of(&outcome),
        (FlashLevel::Success, "Item updated successfully.".to_string())
    );

    let after = store.get_by_id("items", &id).await.unwrap().unwrap();
    assert_eq!(after.get_str("name"), Some("Gadget"));
    assert_eq!(after.get_str("created_at"), before.get_str("created_at"));
    assert!(after.get_str("updated_at") >= before.get_str("updated_at"));
    assert_ne!(after.get_str("updated_at"), before.get_str("updated_at"));
}

#[tokio::test]
async fn deleted_item_is_gone() {
    let store = Arc::new(MemoryStore::new());
    let controller = items(&store);
    controller
        .submit_create(&fields(json!({"name": "Widget", "description": "A small widget"})))
        .await;
    let id = store.list_all("items").await.unwrap()[0].id().unwrap();

    let outcome = controller.destroy(&id).await;
    assert_eq!(
        flash_of(&outcome),
        (FlashLevel::Success, "Item deleted successfully.".to_string())
    );
    assert!(store.get_by_id("items", &id).await.unwrap().is_none());

    let shown = controller.show(&id).await;
    assert_eq!(
        flash_of(&shown),
        (FlashLevel::Error, "Item not found.".to_string())
    );
}

#[tokio::test]
async fn invalid_item_never_reaches_the_store() {
    let store = Arc::new(MemoryStore::new());
    // Any store call would fail loudly.
    store.set_available(false);
    let controller = items(&store);

    let outcome = controller
        .submit_create(&fields(json!({"name": "", "description": "Something"})))
        .await;
    let Outcome::Redirect(redirect) = outcome else {
        panic!("expected a redirect back to the form");
    };
    assert_eq!(redirect.target, Target::Create);
    assert_eq!(redirect.flash.level, FlashLevel::Error);
    assert_eq!(
        redirect.flash.errors.get("name"),
        ["The name field is required.".to_string()]
    );
    assert_eq!(redirect.flash.input["description"], "Something");

    store.set_available(true);
    assert_eq!(store.len("items").await, 0);
}

#[tokio::test]
async fn invalid_update_never_reaches_the_store() {
    let store = Arc::new(MemoryStore::new());
    let controller = items(&store);
    controller
        .submit_create(&fields(json!({"name": "Widget", "description": "A small widget"})))
        .await;
    let id = store.list_all("items").await.unwrap()[0].id().unwrap();
    store.set_available(false);

    let cases = [
        (json!({"name": "", "description": "Renamed"}), "The name field is required."),
        (
            json!({"name": "x".repeat(256), "description": "Renamed"}),
            "The name field must not be greater than 255 characters.",
        ),
    ];
    for (input, message) in cases {
        let outcome = controller.submit_update(&id, &fields(input)).await;
        let Outcome::Redirect(redirect) = outcome else {
            panic!("expected a redirect back to the edit form");
        };
        assert_eq!(redirect.target, Target::Edit(id.clone()));
        assert_eq!(redirect.flash.message, None);
        assert_eq!(redirect.flash.errors.get("name"), [message.to_string()]);
    }

    store.set_available(true);
    let stored = store.get_by_id("items", &id).await.unwrap().unwrap();
    assert_eq!(stored.get_str("name"), Some("Widget"));
}

#[tokio::test]
async fn overlong_name_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let controller = items(&store);

    let outcome = controller
        .submit_create(&fields(json!({"name": "x".repeat(256), "description": "d"})))
        .await;
    let flash = outcome.flash().unwrap();
    assert_eq!(
        flash.errors.get("name"),
        ["The name field must not be greater than 255 characters.".to_string()]
    );
    assert_eq!(store.len("items").await, 0);
}

#[tokio::test]
async fn update_of_unknown_item_reports_not_found() {
    let store = Arc::new(MemoryStore::new());
    let controller = items(&store);

    let outcome = controller
        .submit_update("999", &fields(json!({"name": "Ghost", "description": "None"})))
        .await;
    assert_eq!(
        flash_of(&outcome),
        (FlashLevel::Error, "Item not found.".to_string())
    );
    assert_eq!(store.len("items").await, 0);
}

#[tokio::test]
async fn unconfirmed_write_is_a_warning() {
    let store = Arc::new(MemoryStore::new());
    store.set_confirm_writes(false);
    let controller = items(&store);

    let outcome = controller
        .submit_create(&fields(json!({"name": "Widget", "description": "A small widget"})))
        .await;
    assert!(outcome.is_warning());
    assert_eq!(
        flash_of(&outcome),
        (
            FlashLevel::Warning,
            "Item may not have been created. Please check the database.".to_string()
        )
    );

    // The write still landed; updating it is equally unconfirmed.
    let id = store.list_all("items").await.unwrap()[0].id().unwrap();
    let outcome = controller
        .submit_update(&id, &fields(json!({"name": "Gadget", "description": "Renamed"})))
        .await;
    assert_eq!(
        flash_of(&outcome),
        (
            FlashLevel::Warning,
            "Item may not have been updated. Please check the database.".to_string()
        )
    );
}

#[tokio::test]
async fn second_delete_reports_failure() {
    let store = Arc::new(MemoryStore::new());
    let controller = items(&store);
    controller
        .submit_create(&fields(json!({"name": "Widget", "description": "A small widget"})))
        .await;
    let id = store.list_all("items").await.unwrap()[0].id().unwrap();

    controller.destroy(&id).await;
    let outcome = controller.destroy(&id).await;
    assert_eq!(
        flash_of(&outcome),
        (FlashLevel::Error, "Failed to delete item.".to_string())
    );
}

#[tokio::test]
async fn unreachable_store_becomes_an_error_flash() {
    let store = Arc::new(MemoryStore::new());
    store.set_available(false);
    let controller = items(&store);

    let listed = controller.list().await;
    let Outcome::Failure(failure) = listed else {
        panic!("expected a failure");
    };
    assert_eq!(failure.kind, ErrorKind::RemoteUnavailable);
    assert!(failure.message.starts_with("Error retrieving items:"));

    let created = controller
        .submit_create(&fields(json!({"name": "Widget", "description": "A small widget"})))
        .await;
    let Outcome::Redirect(redirect) = created else {
        panic!("expected a redirect back to the form");
    };
    assert_eq!(redirect.target, Target::Create);
    assert!(redirect
        .flash
        .message
        .as_deref()
        .unwrap_or_default()
        .starts_with("Error creating item:"));
    assert_eq!(redirect.flash.input["name"], "Widget");
}

#[tokio::test]
async fn user_outcomes_are_json_shaped() {
    let store = Arc::new(MemoryStore::new());
    let controller = users(&store);

    let created = controller
        .submit_create(&fields(json!({"name": "Ada", "email": "ada@example.com"})))
        .await;
    let Outcome::Success(Payload::Record(record)) = created else {
        panic!("expected the created record");
    };
    let id = record.id().unwrap();
    assert_eq!(record.get_str("email"), Some("ada@example.com"));

    let invalid = controller
        .submit_update(&id, &fields(json!({"name": "Ada", "email": "not-an-email"})))
        .await;
    let Outcome::Failure(failure) = invalid else {
        panic!("expected a validation failure");
    };
    assert_eq!(failure.kind, ErrorKind::ValidationFailed);
    assert!(failure.errors.has("email"));

    let missing = controller.show("999").await;
    assert!(matches!(
        missing,
        Outcome::Failure(ref f) if f.kind == ErrorKind::NotFound && f.message == "User not found."
    ));

    assert!(matches!(
        controller.destroy(&id).await,
        Outcome::Success(Payload::Message(_))
    ));
    assert!(matches!(
        controller.destroy(&id).await,
        Outcome::Failure(ref f) if f.kind == ErrorKind::NotFound
    ));
}

#[tokio::test]
async fn register_reports_auth_account_left_without_record() {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(MemoryAuth::new());
    let accounts = AccountController::new(auth.clone(), Arc::new(users(&store)));
    store.set_available(false);

    let outcome = accounts
        .register(&fields(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "analytical"
        })))
        .await;
    let Outcome::Failure(failure) = outcome else {
        panic!("expected a failure");
    };
    assert_eq!(failure.kind, ErrorKind::RemoteUnavailable);
    assert!(failure
        .message
        .starts_with("The account for ada@example.com was created, but its user record could not be saved:"));

    // The auth account exists; only the record is missing.
    assert!(auth.sign_in("ada@example.com", "analytical").await.is_ok());
    store.set_available(true);
    assert_eq!(store.len("users").await, 0);
}
