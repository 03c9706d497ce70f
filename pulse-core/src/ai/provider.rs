use crate::ai::{error::AiError, model::Model, types::*};

#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, model: Model) -> bool;

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiError>;
}

#[async_trait::async_trait]
impl<P: AiProvider + ?Sized> AiProvider for std::sync::Arc<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supports(&self, model: Model) -> bool {
        (**self).supports(model)
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiError> {
        (**self).generate(request).await
    }
}

#[async_trait::async_trait]
impl<P: AiProvider + ?Sized> AiProvider for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supports(&self, model: Model) -> bool {
        (**self).supports(model)
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, AiError> {
        (**self).generate(request).await
    }
}
