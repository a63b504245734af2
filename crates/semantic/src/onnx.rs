use once_cell::sync::OnceCell;
use onnxruntime::environment::Environment;
use onnxruntime::ndarray::{Array, Array2};
use onnxruntime::session::Session;
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::assets::ModelAssets;
use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, SemanticConfig, SemanticError};

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

/// Flattened first output of the model plus its shape.
#[derive(Debug)]
struct RawOutput {
    shape: Vec<usize>,
    data: Vec<f32>,
}

struct InferenceJob {
    input_ids: Array2<i64>,
    attn_mask: Array2<i64>,
    reply: mpsc::Sender<Result<RawOutput, SemanticError>>,
}

/// Sentence embedder backed by an ONNX Runtime session.
///
/// The session lives on its own worker thread and runs one batch at a time.
/// Tokenization, padding and pooling happen on the caller's thread, so
/// concurrent requests only queue for the `run` call itself.
pub struct OnnxEmbedder {
    tokenizer: Tokenizer,
    jobs: Mutex<mpsc::Sender<InferenceJob>>,
    max_sequence_length: usize,
    normalize: bool,
    model_name: String,
}

impl OnnxEmbedder {
    /// Loads the tokenizer and opens the session. Blocks until the model is
    /// ready or has failed to load.
    pub fn load(assets: &ModelAssets, cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let tokenizer = Tokenizer::from_file(&assets.tokenizer_path)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;

        let (jobs, queue) = mpsc::channel::<InferenceJob>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), SemanticError>>();
        let model_path = assets.model_path.clone();

        thread::Builder::new()
            .name("nlq-onnx".into())
            .spawn(move || match open_session(model_path) {
                Ok(session) => {
                    let _ = ready_tx.send(Ok(()));
                    serve(session, queue);
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })?;

        ready_rx
            .recv()
            .map_err(|_| SemanticError::WorkerUnavailable)??;

        info!(
            model = %cfg.model_name,
            path = %assets.model_path.display(),
            "onnx session ready"
        );

        Ok(Self {
            tokenizer,
            jobs: Mutex::new(jobs),
            max_sequence_length: cfg.max_sequence_length,
            normalize: cfg.normalize,
            model_name: cfg.model_name.clone(),
        })
    }

    fn run(&self, input_ids: Array2<i64>, attn_mask: Array2<i64>) -> Result<RawOutput, SemanticError> {
        let (reply, response) = mpsc::channel();
        {
            let jobs = self
                .jobs
                .lock()
                .map_err(|_| SemanticError::WorkerUnavailable)?;
            jobs.send(InferenceJob {
                input_ids,
                attn_mask,
                reply,
            })
            .map_err(|_| SemanticError::WorkerUnavailable)?;
        }
        response
            .recv()
            .map_err(|_| SemanticError::WorkerUnavailable)?
    }
}

impl Embedder for OnnxEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let (encoded, max_len) = encode_documents(&self.tokenizer, texts, self.max_sequence_length)?;
        let (input_ids, attn_mask) = build_padded_arrays(encoded, max_len)?;
        debug!(batch = texts.len(), seq_len = max_len, "running onnx batch");

        let raw = self.run(input_ids, attn_mask.clone())?;
        let mut vectors = pool_output(raw, &attn_mask)?;
        if self.normalize {
            for vector in &mut vectors {
                l2_normalize_in_place(vector);
            }
        }
        Ok(vectors)
    }
}

fn ort_environment() -> Result<&'static Environment, SemanticError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("nlq")
            .build()
            .map_err(|e| SemanticError::Inference(e.to_string()))
    })
}

fn open_session(model_path: PathBuf) -> Result<Session<'static>, SemanticError> {
    ort_environment()?
        .new_session_builder()
        .map_err(|e| SemanticError::Inference(e.to_string()))?
        .with_model_from_file(model_path)
        .map_err(|e| SemanticError::Inference(e.to_string()))
}

/// Worker loop. Ends once every sender has been dropped.
fn serve(mut session: Session<'static>, queue: mpsc::Receiver<InferenceJob>) {
    for job in queue {
        let result = run_session(&mut session, job.input_ids, job.attn_mask);
        let _ = job.reply.send(result);
    }
}

struct EncodedDoc {
    ids: Vec<i64>,
    mask: Vec<i64>,
}

fn encode_documents(
    tokenizer: &Tokenizer,
    texts: &[&str],
    max_sequence_length: usize,
) -> Result<(Vec<EncodedDoc>, usize), SemanticError> {
    let mut encoded = Vec::with_capacity(texts.len());
    let mut max_len = 0usize;

    for text in texts {
        let encoding = tokenizer
            .encode(*text, true)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let mut mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();
        ids.truncate(max_sequence_length);
        mask.truncate(max_sequence_length);
        max_len = max_len.max(ids.len());
        encoded.push(EncodedDoc { ids, mask });
    }

    Ok((encoded, max_len))
}

fn build_padded_arrays(
    encoded: Vec<EncodedDoc>,
    max_len: usize,
) -> Result<(Array2<i64>, Array2<i64>), SemanticError> {
    let seq_len = max_len.max(1);
    let batch = encoded.len();
    let mut id_storage = Vec::with_capacity(batch * seq_len);
    let mut mask_storage = Vec::with_capacity(batch * seq_len);

    for EncodedDoc { ids, mask } in encoded {
        if ids.len() != mask.len() {
            return Err(SemanticError::Inference(
                "tokenizer produced mismatched id/mask lengths".into(),
            ));
        }
        let pad = seq_len.saturating_sub(ids.len());
        id_storage.extend(ids);
        mask_storage.extend(mask);
        id_storage.extend(std::iter::repeat_n(0, pad));
        mask_storage.extend(std::iter::repeat_n(0, pad));
    }

    let input_ids = Array::from_shape_vec((batch, seq_len), id_storage)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let attn_mask = Array::from_shape_vec((batch, seq_len), mask_storage)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    Ok((input_ids, attn_mask))
}

fn run_session(
    session: &mut Session<'static>,
    input_ids: Array2<i64>,
    attn_mask: Array2<i64>,
) -> Result<RawOutput, SemanticError> {
    let (batch, seq_len) = input_ids.dim();
    let mut runtime_inputs = Vec::with_capacity(session.inputs.len());
    let mut input_ids_tensor = Some(input_ids);
    let mut attn_mask_tensor = Some(attn_mask);

    for input in &session.inputs {
        match input.name.as_str() {
            "input_ids" => {
                let tensor = input_ids_tensor.take().ok_or_else(|| {
                    SemanticError::InvalidConfig("model requested `input_ids` multiple times".into())
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "attention_mask" => {
                let tensor = attn_mask_tensor.take().ok_or_else(|| {
                    SemanticError::InvalidConfig(
                        "model requested `attention_mask` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "token_type_ids" => {
                runtime_inputs.push(Array::from_elem((batch, seq_len), 0_i64).into_dyn());
            }
            other => {
                return Err(SemanticError::Inference(format!(
                    "unsupported model input '{other}'"
                )))
            }
        }
    }

    if runtime_inputs.is_empty() {
        return Err(SemanticError::Inference(
            "model did not declare any inputs".into(),
        ));
    }

    let outputs = session
        .run::<i64, f32, _>(runtime_inputs)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let output = outputs
        .into_iter()
        .next()
        .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))?;

    Ok(RawOutput {
        shape: output.shape().to_vec(),
        data: output.iter().copied().collect(),
    })
}

/// Turns the model output into one vector per input.
///
/// `[batch, dim]` outputs are already sentence vectors. `[batch, seq, dim]`
/// outputs are token vectors and get averaged over the positions the
/// attention mask marks as real tokens.
fn pool_output(raw: RawOutput, attn_mask: &Array2<i64>) -> Result<Vec<Vec<f32>>, SemanticError> {
    let (batch, seq_len) = attn_mask.dim();
    let expected: usize = raw.shape.iter().product();
    if expected != raw.data.len() {
        return Err(SemanticError::Inference(format!(
            "model output holds {} values for shape {:?}",
            raw.data.len(),
            raw.shape
        )));
    }

    match raw.shape.as_slice() {
        &[b, 0] if b == batch => Ok(vec![Vec::new(); batch]),
        &[b, dim] if b == batch => Ok(raw.data.chunks(dim).map(<[f32]>::to_vec).collect()),
        &[b, s, dim] if b == batch && s == seq_len => {
            let mut pooled = Vec::with_capacity(batch);
            for row in 0..batch {
                let mut sum = vec![0f32; dim];
                let mut count = 0f32;
                for pos in 0..seq_len {
                    if attn_mask[[row, pos]] == 0 {
                        continue;
                    }
                    count += 1.0;
                    let offset = (row * seq_len + pos) * dim;
                    for (acc, &x) in sum.iter_mut().zip(&raw.data[offset..offset + dim]) {
                        *acc += x;
                    }
                }
                if count > 0.0 {
                    for x in &mut sum {
                        *x /= count;
                    }
                }
                pooled.push(sum);
            }
            Ok(pooled)
        }
        other => Err(SemanticError::Inference(format!(
            "unexpected model output shape {other:?} for batch {batch} x {seq_len}"
        ))),
    }
}
