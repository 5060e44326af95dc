use cubescene_render::TextureError;

/// Errors from the wgpu backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A shader module or its pipeline was rejected by the device. The
    /// renderer keeps running and skips draws that need the program.
    #[error("shader program `{label}` failed to build: {message}")]
    ShaderProgram { label: &'static str, message: String },
    #[error("texture generation failed: {0}")]
    Texture(#[from] TextureError),
}
