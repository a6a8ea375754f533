use std::sync::Arc;

use actix_web::{http::header::ContentType, web, HttpResponse};
use random_dish::{
    data::RecipeRecord,
    selector::{DishSelector, SelectorError},
    state::{AppState, LoadState},
};

use crate::page;

pub(super) struct ApiState {
    app: Arc<AppState>,
    selector: DishSelector,
}

impl ApiState {
    pub(super) fn new(app: Arc<AppState>, selector: DishSelector) -> Self {
        Self { app, selector }
    }
}

/// Every response of the action endpoint carries all five keys. On failure the
/// message goes into `dishName` and the rest stay empty.
#[derive(serde::Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct DishJsonResp {
    dish_name: String,
    dish_image_url: String,
    recipe_description: String,
    recipe_material: String,
    recipe_url: String,
}

impl DishJsonResp {
    fn message(message: impl Into<String>) -> Self {
        Self {
            dish_name: message.into(),
            ..Default::default()
        }
    }
}

impl From<RecipeRecord> for DishJsonResp {
    fn from(recipe: RecipeRecord) -> Self {
        let recipe_material = recipe.ingredients_text();
        Self {
            dish_name: recipe.title,
            dish_image_url: recipe.image_url,
            recipe_description: recipe.description,
            recipe_material,
            recipe_url: recipe.url,
        }
    }
}

#[actix_web::get("/")]
pub(super) async fn index(data: web::Data<ApiState>) -> HttpResponse {
    let message = data.app.snapshot().status_message();
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page::render(&message))
}

#[actix_web::post("/api/generateDish")]
pub(super) async fn generate_dish(data: web::Data<ApiState>) -> HttpResponse {
    let load = data.app.snapshot();
    let store = match &load {
        LoadState::Ready(store) => Some(store.as_ref()),
        _ => None,
    };

    match data.selector.pick_random_dish(store).await {
        Ok(recipe) => HttpResponse::Ok().json(DishJsonResp::from(recipe)),
        Err(SelectorError::NotReady) => {
            HttpResponse::ServiceUnavailable().json(DishJsonResp::message(load.status_message()))
        }
        Err(SelectorError::EmptyCategory(path)) => HttpResponse::NotFound().json(
            DishJsonResp::message(format!(
                "このカテゴリ（{path}）には料理がありませんでした。もう一度！"
            )),
        ),
        Err(SelectorError::PathResolution(_)) => HttpResponse::InternalServerError()
            .json(DishJsonResp::message("カテゴリパス生成エラー。もう一度！")),
        Err(e) => {
            tracing::error!("fail to generate dish: {e}");
            HttpResponse::InternalServerError()
                .json(DishJsonResp::message("料理生成中にエラーが発生しました。"))
        }
    }
}
