//! End-to-end tests for the recipe service over fake providers and the
//! in-memory store.

use pantry_core::config::{ImagePolicy, ServiceConfig, TitleStrategy};
use pantry_core::imagegen::FakeImageGenerator;
use pantry_core::llm::FakeProvider;
use pantry_core::{
    ImageAcquirer, MemoryRecipeStore, RecipeGenerator, RecipeRequest, RecipeService, RecipeStore,
    ServiceError,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    service: RecipeService,
    text: Arc<FakeProvider>,
    image: Arc<FakeImageGenerator>,
    store: Arc<MemoryRecipeStore>,
    dir: TempDir,
}

fn harness(text: FakeProvider, image: FakeImageGenerator, config: ServiceConfig) -> Harness {
    let dir = TempDir::new().unwrap();
    let text = Arc::new(text);
    let image = Arc::new(image);
    let store = Arc::new(MemoryRecipeStore::new());

    let acquirer = ImageAcquirer::new(image.clone(), dir.path().to_path_buf(), 60);
    let generator = RecipeGenerator::new(text.clone(), acquirer, config.image_policy);
    let service = RecipeService::new(generator, store.clone(), config);

    Harness {
        service,
        text,
        image,
        store,
        dir,
    }
}

fn default_harness() -> Harness {
    harness(
        FakeProvider::default(),
        FakeImageGenerator::default(),
        ServiceConfig::default(),
    )
}

fn egg_and_bread(owner: &str) -> RecipeRequest {
    RecipeRequest {
        owner_id: owner.to_string(),
        ingredients: vec!["egg".to_string(), "bread".to_string()],
        budget: 5.0,
        time_minutes: 10,
        serves: 1,
        meal_type: "breakfast".to_string(),
    }
}

#[tokio::test]
async fn test_create_recipe_stores_recipe_and_cropped_image() {
    let h = default_harness();

    let recipe = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();
    assert_eq!(recipe.title, "French Toast");
    assert_eq!(recipe.ingredients.len(), 3);

    let image_path = recipe.image_path.clone().unwrap();
    assert!(Path::new(&image_path).starts_with(h.dir.path()));

    // 256px fake image with 60px cropped from the bottom
    let img = image::open(&image_path).unwrap();
    assert_eq!((img.width(), img.height()), (256, 196));

    let listed = h.service.list_recipes("u1").unwrap();
    assert_eq!(listed, vec![recipe]);

    let prompts = h.text.received_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("egg, bread"));
}

#[tokio::test]
async fn test_declined_reply_requests_no_image_and_stores_nothing() {
    let h = harness(
        FakeProvider::new().with_default_response("0;0;0;0;0"),
        FakeImageGenerator::default(),
        ServiceConfig::default(),
    );

    let err = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Declined));
    assert_eq!(err.to_string(), "Could not generate recipe");
    assert_eq!(h.image.call_count(), 0);
    assert!(h.store.titles().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_reply_is_a_parse_error() {
    let h = harness(
        FakeProvider::new().with_default_response("a;b;c;d"),
        FakeImageGenerator::default(),
        ServiceConfig::default(),
    );

    let err = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Parse(_)));
    assert!(h.store.titles().unwrap().is_empty());
}

#[tokio::test]
async fn test_incomplete_reply_requests_no_image_and_stores_nothing() {
    let h = harness(
        FakeProvider::new().with_default_response("Toast;;;;a plate of toast"),
        FakeImageGenerator::default(),
        ServiceConfig {
            image_policy: ImagePolicy::BestEffort,
            ..Default::default()
        },
    );

    let err = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Parse(_)));
    assert_eq!(h.image.call_count(), 0);
    assert!(h.store.list("u1").unwrap().is_empty());
}

#[tokio::test]
async fn test_required_image_failure_stores_nothing() {
    let h = harness(
        FakeProvider::default(),
        FakeImageGenerator::failing("generator down"),
        ServiceConfig::default(),
    );

    let err = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Image(_)));
    assert!(h.service.list_recipes("u1").unwrap().is_empty());
}

#[tokio::test]
async fn test_best_effort_stores_recipe_without_image() {
    let h = harness(
        FakeProvider::default(),
        FakeImageGenerator::failing("generator down"),
        ServiceConfig {
            image_policy: ImagePolicy::BestEffort,
            ..Default::default()
        },
    );

    let recipe = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();
    assert!(recipe.image_path.is_none());
    assert_eq!(h.service.list_recipes("u1").unwrap().len(), 1);
}

#[tokio::test]
async fn test_colliding_titles_are_suffixed() {
    let h = default_harness();

    let mut titles = Vec::new();
    for _ in 0..3 {
        titles.push(h.service.create_recipe(&egg_and_bread("u1")).await.unwrap().title);
    }
    assert_eq!(titles, vec!["French Toast", "French Toast (1)", "French Toast (2)"]);

    // Another owner gets the plain title
    let other = h.service.create_recipe(&egg_and_bread("u2")).await.unwrap();
    assert_eq!(other.title, "French Toast");
}

#[tokio::test]
async fn test_ask_provider_renames_then_suffixes() {
    let h = harness(
        FakeProvider::default(),
        FakeImageGenerator::default(),
        ServiceConfig {
            title_strategy: TitleStrategy::AskProvider,
            ..Default::default()
        },
    );

    let first = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();
    let second = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();
    let third = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();

    assert_eq!(first.title, "French Toast");
    assert_eq!(second.title, "Golden Morning Toast");
    assert_eq!(third.title, "Golden Morning Toast (1)");
}

#[tokio::test]
async fn test_image_lookup_is_owner_scoped() {
    let h = default_harness();
    h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();

    let image = h.service.image_for("u1", "French_Toast").unwrap();
    assert_eq!(image.content_type, "image/png");

    assert!(matches!(
        h.service.image_for("u2", "French_Toast"),
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        h.service.image_for("u1", "Pancakes"),
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_image_lookup_fallback_when_enabled() {
    let h = harness(
        FakeProvider::default(),
        FakeImageGenerator::default(),
        ServiceConfig {
            image_lookup_fallback: true,
            ..Default::default()
        },
    );
    h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();

    assert!(h.service.image_for("u2", "French Toast").is_ok());
}

#[tokio::test]
async fn test_missing_image_file_is_not_found() {
    let h = default_harness();
    let recipe = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();
    std::fs::remove_file(recipe.image_path.unwrap()).unwrap();

    assert!(matches!(
        h.service.image_for("u1", "French Toast"),
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_scan_saves_only_with_owner() {
    let h = default_harness();
    let photo = FakeImageGenerator::render_png(32, 32).unwrap();

    let anonymous = h.service.scan_and_save("salad.png", &photo, None).await.unwrap();
    assert!(!anonymous.saved);
    assert_eq!(anonymous.recipe.title, "Garden Salad");
    assert!(h.store.titles().unwrap().is_empty());

    let owned = h
        .service
        .scan_and_save("salad.png", &photo, Some("u1"))
        .await
        .unwrap();
    assert!(owned.saved);
    let image_path = owned.recipe.image_path.unwrap();
    assert!(image_path.contains("uploads"));
    assert!(image_path.ends_with("_salad.png"));
    assert_eq!(h.service.list_recipes("u1").unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_scan_removes_upload() {
    let h = harness(
        FakeProvider::new().with_default_response("Salad;0;0;0;0"),
        FakeImageGenerator::default(),
        ServiceConfig::default(),
    );
    let photo = FakeImageGenerator::render_png(32, 32).unwrap();

    let result = h.service.scan_and_save("salad.png", &photo, Some("u1")).await;
    assert!(matches!(result, Err(ServiceError::Parse(_))));

    let uploads = h.dir.path().join("uploads");
    let left = std::fs::read_dir(&uploads).map(|d| d.count()).unwrap_or(0);
    assert_eq!(left, 0);
    assert!(h.store.list("u1").unwrap().is_empty());
}

#[tokio::test]
async fn test_image_lookup_treats_underscores_as_spaces() {
    let h = harness(
        FakeProvider::with_response(
            "ingredients the user has at home",
            r#"{"status": "ok", "title": "Mac_Cheese", "description": "Creamy.",
                "ingredients": ["pasta", "cheese"], "procedures": ["boil", "stir"],
                "image_prompt": "a bowl of macaroni"}"#,
        ),
        FakeImageGenerator::default(),
        ServiceConfig::default(),
    );
    let recipe = h.service.create_recipe(&egg_and_bread("u1")).await.unwrap();
    assert_eq!(recipe.title, "Mac_Cheese");

    // The request title becomes "Mac Cheese", which was never stored
    assert!(matches!(
        h.service.image_for("u1", "Mac_Cheese"),
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_scan_rejects_empty_and_non_image_uploads() {
    let h = default_harness();

    assert!(matches!(
        h.service.scan_and_save("x.png", &[], None).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        h.service.scan_and_save("x.png", b"not an image", None).await,
        Err(ServiceError::Validation(_))
    ));
    assert_eq!(h.text.call_count(), 0);
}

#[tokio::test]
async fn test_side_operations() {
    let h = default_harness();

    let facts = h.service.nutrition_facts("French toast with butter").await.unwrap();
    assert_eq!(facts.totalfat, "12 g");

    let estimate = h
        .service
        .estimate_cost(&["2 eggs".to_string(), " ".to_string()])
        .await
        .unwrap();
    assert_eq!(estimate.ingredients, vec!["2 eggs"]);
    assert_eq!(estimate.estimated_cost, 4.5);

    let file_name = h.service.generate_image("a bowl of soup").await.unwrap();
    let served = h.service.generated_image(&file_name).unwrap();
    assert!(served.path.is_file());
    assert!(h.service.generated_image("../secret.png").is_err());

    assert!(matches!(
        h.service.estimate_cost(&[]).await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn test_allocate_user_and_reset() {
    let h = default_harness();
    let id = h.service.allocate_user().unwrap();
    assert_eq!(id.len(), 36);

    h.service.create_recipe(&egg_and_bread(&id)).await.unwrap();
    h.service.reset().unwrap();
    assert!(h.service.list_recipes(&id).unwrap().is_empty());

    h.service.create_recipe(&egg_and_bread(&id)).await.unwrap();
    assert_eq!(h.service.list_recipes(&id).unwrap().len(), 1);
}
