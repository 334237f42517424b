use ndarray::Array4;
use ort::{
    session::Session,
    value::{Tensor, Value},
};

use crate::{classifier::ClassificationResult, error::AdapterError};

fn prepare_input_for_inference(
    input: Array4<f32>,
) -> ort::Result<Value<ort::value::TensorValueType<f32>>> {
    let shape = input.shape().to_vec();
    let data = input.into_raw_vec_and_offset().0.into_boxed_slice();
    Tensor::from_array((shape, data))
}

/// Run the model on one preprocessed image and return the flat logits.
pub fn run_inference(session: &mut Session, input: Array4<f32>) -> ort::Result<Vec<f32>> {
    let input = prepare_input_for_inference(input)?;
    let input_name = session.inputs[0].name.clone();
    let outputs = session.run(ort::inputs![input_name => input])?;

    // First output: logits of shape [1, num_labels]
    let logits = outputs[0].try_extract_array::<f32>()?;
    Ok(logits.iter().copied().collect())
}

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .copied()
        .map(f64::from)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&x| (f64::from(x) - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Pair probabilities with labels, highest score first.
pub fn rank(
    labels: &[String],
    probabilities: &[f64],
) -> Result<Vec<ClassificationResult>, AdapterError> {
    if labels.len() != probabilities.len() {
        return Err(AdapterError::InvalidOutput(format!(
            "model produced {} scores for {} labels",
            probabilities.len(),
            labels.len()
        )));
    }

    let mut results: Vec<ClassificationResult> = labels
        .iter()
        .zip(probabilities)
        .map(|(label, &score)| ClassificationResult::new(label, score))
        .collect();
    results.sort_by(|a, b| b.score().total_cmp(&a.score()));
    Ok(results)
}
