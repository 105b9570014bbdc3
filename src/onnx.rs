use std::path::Path;

use anyhow::{anyhow, Result};
use gliner::model::{input::text::TextInput, pipeline::span::SpanMode, GLiNER};
use orp::params::RuntimeParameters;

use crate::classify::{plain_transcript, wrap_phrases, InlineClassifier};
use crate::entity::EntityType;

const LABELS: [&str; 2] = ["person", "location"];

/// GLiNER-backed classifier. The model is loaded once and reused; recognized
/// spans come back as (text, class) pairs and are wrapped by occurrence, so
/// the inline output format matches the lexicon classifier's.
pub struct OnnxClassifier {
    model: GLiNER<SpanMode>,
}

impl OnnxClassifier {
    pub fn load(model_dir: &Path) -> Result<Self> {
        let tokenizer = model_dir.join("tokenizer.json");
        let weights = model_dir.join("model.onnx");
        if !tokenizer.exists() || !weights.exists() {
            return Err(anyhow!(
                "model directory {} must contain tokenizer.json and model.onnx",
                model_dir.display()
            ));
        }
        let model = GLiNER::<SpanMode>::new(
            Default::default(),
            RuntimeParameters::default(),
            tokenizer,
            weights,
        )
        .map_err(|e| anyhow!("failed to load GLiNER model: {e}"))?;
        Ok(Self { model })
    }

    fn entries_for(&self, text: &str) -> Result<Vec<(String, EntityType)>> {
        let input = TextInput::from_str(&[text], &LABELS)
            .map_err(|e| anyhow!("failed to build model input: {e}"))?;
        let output = self
            .model
            .inference(input)
            .map_err(|e| anyhow!("inference failed: {e}"))?;

        let mut entries = Vec::new();
        for spans in output.spans.iter() {
            for span in spans.iter() {
                entries.push((span.text().to_string(), EntityType::from_label(span.class())));
            }
        }
        Ok(entries)
    }
}

impl InlineClassifier for OnnxClassifier {
    fn classify_inline(&self, text: &str) -> Result<String> {
        let entries = self.entries_for(text)?;
        Ok(wrap_phrases(text, &entries))
    }

    fn classify_plain(&self, text: &str) -> Result<String> {
        let entries = self.entries_for(text)?;
        Ok(plain_transcript(text, &entries))
    }
}
