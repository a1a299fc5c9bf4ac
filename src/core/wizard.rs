//! Five-step tutorial state.
//!
//! The controller is owned by the TUI app state and lent to the step views.
//! Forward navigation is gated on the image the current step is meant to
//! produce; everything else moves freely within bounds.

use super::sticker::StickerImage;

pub const TOTAL_STEPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Generate,
    Explainer,
    Diffusion,
    PromptBuilder,
    Edit,
}

impl Step {
    pub const ALL: [Step; TOTAL_STEPS] = [
        Step::Generate,
        Step::Explainer,
        Step::Diffusion,
        Step::PromptBuilder,
        Step::Edit,
    ];

    pub fn index(&self) -> usize {
        match self {
            Step::Generate => 0,
            Step::Explainer => 1,
            Step::Diffusion => 2,
            Step::PromptBuilder => 3,
            Step::Edit => 4,
        }
    }

    /// Step at `index`, clamped to the last step.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(TOTAL_STEPS - 1)]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Generate => "Create",
            Step::Explainer => "What is AI",
            Step::Diffusion => "How it works",
            Step::PromptBuilder => "Prompting",
            Step::Edit => "Editing",
        }
    }

    pub fn is_last(&self) -> bool {
        self.index() == TOTAL_STEPS - 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct WizardController {
    current: usize,
    generated_image: Option<StickerImage>,
    prompt_builder_image: Option<StickerImage>,
    last_prompt: String,
    image_revision: u64,
}

impl WizardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        Step::from_index(self.current)
    }

    pub fn step_index(&self) -> usize {
        self.current
    }

    /// Whether the guard for the current step is satisfied.
    pub fn can_advance(&self) -> bool {
        match self.step() {
            Step::Generate => self.generated_image.is_some(),
            Step::PromptBuilder => self.prompt_builder_image.is_some(),
            Step::Edit => false,
            Step::Explainer | Step::Diffusion => true,
        }
    }

    /// Move forward one step. Returns `true` if the step changed.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.current += 1;
        log::debug!("Wizard advanced to step {}", self.current);
        true
    }

    /// Move back one step. Returns `true` if the step changed.
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Back to step 0 with no images and no prompt.
    pub fn restart(&mut self) {
        let had_image = self.generated_image.is_some();
        self.current = 0;
        self.generated_image = None;
        self.prompt_builder_image = None;
        self.last_prompt.clear();
        if had_image {
            self.image_revision += 1;
        }
        log::info!("Wizard restarted");
    }

    pub fn generated_image(&self) -> Option<&StickerImage> {
        self.generated_image.as_ref()
    }

    pub fn set_generated_image(&mut self, image: Option<StickerImage>) {
        self.generated_image = image;
        self.image_revision += 1;
    }

    pub fn prompt_builder_image(&self) -> Option<&StickerImage> {
        self.prompt_builder_image.as_ref()
    }

    pub fn set_prompt_builder_image(&mut self, image: Option<StickerImage>) {
        self.prompt_builder_image = image;
    }

    pub fn last_prompt(&self) -> &str {
        &self.last_prompt
    }

    pub fn set_last_prompt(&mut self, prompt: impl Into<String>) {
        self.last_prompt = prompt.into();
    }

    /// Bumped whenever the generated image is replaced or cleared.
    pub fn image_revision(&self) -> u64 {
        self.image_revision
    }
}
