//! Visual-Suggestion stage: analysis + simplified content → [`VisualPlan`].
//!
//! The prompt asks for exact cardinalities (one hero image, three
//! diagrams, one infographic with four elements, five extra prompts, five
//! design suggestions), but those counts are instructions to the backend,
//! not parse requirements: the stage accepts whatever well-formed plan
//! comes back and only a total parse failure is fatal. Rejecting an
//! otherwise-useful plan because the model drew two diagrams instead of
//! three would trade a working post for nothing.

use crate::backend::GenerativeBackend;
use crate::error::StageError;
use crate::pipeline::generate::generate_structured;
use crate::prompts::{visualizer_prompt, VISUALIZER_SYSTEM_PROMPT};
use crate::records::{AnalysisRecord, SimplifiedRecord, VisualPlan};
use tracing::info;

pub const TEMPERATURE: f32 = 0.7;

/// Run the Visual-Suggestion stage.
pub async fn run(
    backend: &dyn GenerativeBackend,
    analysis: &AnalysisRecord,
    simplified: &SimplifiedRecord,
) -> Result<VisualPlan, StageError> {
    let prompt = visualizer_prompt(analysis, simplified);
    let plan: VisualPlan =
        generate_structured(backend, &prompt, VISUALIZER_SYSTEM_PROMPT, TEMPERATURE).await?;

    info!(
        diagrams = plan.diagrams.len(),
        infographics = plan.infographics.len(),
        image_prompts = plan.image_prompts.len(),
        "visual plan complete"
    );

    Ok(plan)
}
