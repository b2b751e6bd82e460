//! MeokPT MCP Server Implementation
//!
//! Implements the MCP server with all MeokPT tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::nutrition::{Channel, NutrientProfile};
use crate::tools::status::StatusTracker;
use crate::tools::{daily, diets, feedback, profile};

/// MeokPT MCP Service
#[derive(Clone)]
pub struct MeokptService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<MeokptService>,
}

impl MeokptService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Serialize a tool response as pretty JSON text content
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// JSON body for an id lookup that found nothing
fn not_found(what: &str, id: i64) -> Result<CallToolResult, McpError> {
    json_result(&serde_json::json!({ "error": format!("{} not found", what), "id": id }))
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

/// Nutrient values; leave a field out when it is unknown
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NutrientParams {
    pub energy_kcal: f64,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

impl From<NutrientParams> for NutrientProfile {
    fn from(p: NutrientParams) -> Self {
        NutrientProfile {
            energy_kcal: p.energy_kcal,
            carb_g: p.carb_g,
            protein_g: p.protein_g,
            fat_g: p.fat_g,
            fiber_g: p.fiber_g,
            sugar_g: p.sugar_g,
            sodium_mg: p.sodium_mg,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BodyMetricsParams {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    /// "male" or "female"
    pub sex: String,
    /// very_low, low, medium, high, very_high (or the multiplier, e.g. "1.55")
    pub activity_level: String,
    /// lose_weight, gain_muscle or maintain_weight
    pub goal: String,
}

impl BodyMetricsParams {
    fn parse(&self) -> Result<crate::nutrition::BodyMetrics, McpError> {
        profile::parse_metrics(
            self.weight_kg,
            self.height_cm,
            self.age,
            &self.sex,
            &self.activity_level,
            &self.goal,
        )
        .map_err(|e| McpError::invalid_params(e, None))
    }
}

// ============================================================================
// Diet Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateDietParams {
    pub title: String,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    /// breakfast, lunch, dinner, snack or unspecified
    #[serde(default = "default_meal_slot")]
    pub meal_slot: String,
    #[serde(default)]
    pub is_shared: bool,
    pub notes: Option<String>,
}

fn default_meal_slot() -> String { "unspecified".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DietIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDietsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub shared_only: bool,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDietParams {
    pub id: i64,
    pub title: Option<String>,
    pub date: Option<String>,
    pub meal_slot: Option<String>,
    pub is_shared: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDatabaseFoodParams {
    pub diet_id: i64,
    pub name: String,
    /// Grams eaten
    pub amount_g: f64,
    /// Values per 100 g as listed by the food database
    pub per_100g: NutrientParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddManualFoodParams {
    pub diet_id: i64,
    pub name: String,
    /// Grams eaten
    pub amount_g: f64,
    /// Values for the amount eaten
    pub nutrients: NutrientParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodAmountParams {
    pub food_id: i64,
    pub amount_g: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodNutrientParams {
    pub food_id: i64,
    /// energy, carbohydrate, protein, fat, fiber, sugar or sodium
    pub nutrient: String,
    /// New value for the current amount; null marks it as not provided
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FoodIdParams {
    pub food_id: i64,
}

// ============================================================================
// Day / Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// ISO date (YYYY-MM-DD)
    pub date: String,
}

/// Target channels to override; leave a field out to keep its stored value
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ManualTargetParams {
    pub energy_kcal: Option<f64>,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

impl ManualTargetParams {
    fn entries(&self) -> Vec<(Channel, f64)> {
        [
            (Channel::Energy, self.energy_kcal),
            (Channel::Carbohydrate, self.carb_g),
            (Channel::Protein, self.protein_g),
            (Channel::Fat, self.fat_g),
            (Channel::Fiber, self.fiber_g),
            (Channel::Sugar, self.sugar_g),
            (Channel::Sodium, self.sodium_mg),
        ]
        .into_iter()
        .filter_map(|(channel, value)| value.map(|v| (channel, v)))
        .collect()
    }
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MeokptService {
    // --- Status ---

    #[tool(description = "Get the current status of the MeokPT service including build info, database status, and process information")]
    async fn meokpt_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status())
    }

    #[tool(description = "Get instructions for logging diets and reading targets. Call this when starting a diet logging session or when unsure how to use the tools.")]
    fn diet_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::DIET_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(DIET_INSTRUCTIONS)]))
    }

    // --- Diets ---

    #[tool(description = "Create an empty diet (a titled group of foods) for a date and meal slot")]
    fn create_diet(&self, Parameters(p): Parameters<CreateDietParams>) -> Result<CallToolResult, McpError> {
        let result = diets::create_diet(&self.database, &p.title, &p.date, Some(p.meal_slot.as_str()), p.is_shared, p.notes)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a diet with its foods and computed nutrient total")]
    fn get_diet(&self, Parameters(p): Parameters<DietIdParams>) -> Result<CallToolResult, McpError> {
        match diets::get_diet(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))? {
            Some(diet) => json_result(&diet),
            None => not_found("Diet", p.id),
        }
    }

    #[tool(description = "List diets with optional date range, shared filter and pagination")]
    fn list_diets(&self, Parameters(p): Parameters<ListDietsParams>) -> Result<CallToolResult, McpError> {
        let result = diets::list_diets(
            &self.database,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.shared_only,
            p.limit,
            p.offset,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a diet's title, date, meal slot, shared flag or notes")]
    fn update_diet(&self, Parameters(p): Parameters<UpdateDietParams>) -> Result<CallToolResult, McpError> {
        let result = diets::update_diet(
            &self.database,
            p.id,
            p.title,
            p.date,
            p.meal_slot.as_deref(),
            p.is_shared,
            p.notes,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(diet) => json_result(&diet),
            None => not_found("Diet", p.id),
        }
    }

    #[tool(description = "Delete a diet and all of its foods")]
    fn delete_diet(&self, Parameters(p): Parameters<DietIdParams>) -> Result<CallToolResult, McpError> {
        let deleted = diets::delete_diet(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&serde_json::json!({ "deleted": deleted, "id": p.id }))
    }

    // --- Foods ---

    #[tool(description = "Add a food from a food database to a diet. Pass values per 100 g; they are scaled to amount_g.")]
    fn add_database_food(&self, Parameters(p): Parameters<AddDatabaseFoodParams>) -> Result<CallToolResult, McpError> {
        let result = diets::add_database_food(&self.database, p.diet_id, &p.name, p.per_100g.into(), p.amount_g)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Add a food to a diet with values entered by hand for the amount eaten")]
    fn add_manual_food(&self, Parameters(p): Parameters<AddManualFoodParams>) -> Result<CallToolResult, McpError> {
        let result = diets::add_manual_food(&self.database, p.diet_id, &p.name, p.amount_g, p.nutrients.into())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Change a food's amount in grams. Nutrients are rescaled from the values the food was added with.")]
    fn update_food_amount(&self, Parameters(p): Parameters<UpdateFoodAmountParams>) -> Result<CallToolResult, McpError> {
        match diets::update_food_amount(&self.database, p.food_id, p.amount_g).map_err(|e| McpError::internal_error(e, None))? {
            Some(result) => json_result(&result),
            None => not_found("Food", p.food_id),
        }
    }

    #[tool(description = "Overwrite one nutrient of a food for its current amount; null marks the nutrient as not provided")]
    fn update_food_nutrient(&self, Parameters(p): Parameters<UpdateFoodNutrientParams>) -> Result<CallToolResult, McpError> {
        let result = diets::update_food_nutrient(&self.database, p.food_id, &p.nutrient, p.value)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(result) => json_result(&result),
            None => not_found("Food", p.food_id),
        }
    }

    #[tool(description = "Remove a food from its diet")]
    fn remove_food(&self, Parameters(p): Parameters<FoodIdParams>) -> Result<CallToolResult, McpError> {
        match diets::remove_food(&self.database, p.food_id).map_err(|e| McpError::internal_error(e, None))? {
            Some(result) => json_result(&result),
            None => not_found("Food", p.food_id),
        }
    }

    // --- Daily ---

    #[tool(description = "Get a day's totals per meal slot and for the whole day, with compliance against the target")]
    fn get_daily_summary(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = daily::get_daily_summary(&self.database, &p.date).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Build the JSON payload (day totals, target, compliance) sent to a feedback text-generation service")]
    fn build_feedback_payload(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = feedback::build_feedback_payload(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Body Profile ---

    #[tool(description = "Store body metrics and derive the daily target from them. Replaces any manual target.")]
    fn set_body_metrics(&self, Parameters(p): Parameters<BodyMetricsParams>) -> Result<CallToolResult, McpError> {
        let metrics = p.parse()?;
        let result = profile::set_body_metrics(&self.database, &metrics).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Override daily target channels by hand; channels left out keep their value. Body metrics must be set first.")]
    fn set_manual_target(&self, Parameters(p): Parameters<ManualTargetParams>) -> Result<CallToolResult, McpError> {
        let result = profile::set_manual_target(&self.database, &p.entries()).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Re-derive the daily target from the stored body metrics. A manual target is left unchanged.")]
    fn recalculate_target(&self) -> Result<CallToolResult, McpError> {
        let result = profile::recalculate_target(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the stored body metrics and daily target")]
    fn get_body_profile(&self) -> Result<CallToolResult, McpError> {
        match profile::get_body_profile(&self.database).map_err(|e| McpError::internal_error(e, None))? {
            Some(result) => json_result(&result),
            None => json_result(&serde_json::json!({ "error": "Body metrics have not been set" })),
        }
    }

    #[tool(description = "Calculate a daily target from body metrics without storing anything, including BMR, TDEE, BMI and macro ratios")]
    fn preview_intake(&self, Parameters(p): Parameters<BodyMetricsParams>) -> Result<CallToolResult, McpError> {
        let metrics = p.parse()?;
        json_result(&profile::preview_intake(&metrics))
    }

    #[tool(description = "List the activity levels with their descriptions and TDEE multipliers")]
    fn list_activity_levels(&self) -> Result<CallToolResult, McpError> {
        json_result(&profile::list_activity_levels())
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MeokptService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "meokpt".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("MeokPT".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MeokPT - Diet logging with nutrient totals and daily intake targets. \
                 IMPORTANT: Call diet_instructions before logging foods. \
                 Diets: create/get/list/update/delete_diet. \
                 Foods: add_database_food (per 100 g), add_manual_food (per amount eaten), \
                 update_food_amount, update_food_nutrient, remove_food. \
                 Days: get_daily_summary, build_feedback_payload. \
                 Targets: set_body_metrics, set_manual_target, recalculate_target, get_body_profile, preview_intake, list_activity_levels."
                    .into(),
            ),
        }
    }
}
