/// One entry of the medium or small category table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: String,
    /// id of the category one level up
    pub parent_id: String,
    pub name: String,
}

/// A recipe picked out of a category ranking, with every fallback already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRecord {
    pub title: String,
    pub image_url: String,
    pub description: String,
    /// `None` when the upstream did not send a material list
    pub ingredients: Option<Vec<String>>,
    pub url: String,
}

impl RecipeRecord {
    /// Ingredients joined with [`MATERIAL_DELIMITER`] in their original order.
    pub fn ingredients_text(&self) -> String {
        match &self.ingredients {
            Some(materials) => materials.join(MATERIAL_DELIMITER),
            None => UNKNOWN_MATERIAL.to_string(),
        }
    }
}

pub const MATERIAL_DELIMITER: &str = "、";
pub const UNKNOWN_TITLE: &str = "（料理名不明）";
pub const NO_DESCRIPTION: &str = "説明はありません。";
pub const UNKNOWN_MATERIAL: &str = "材料は不明です。";
