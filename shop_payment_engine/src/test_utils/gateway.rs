//! A scripted [`PaymentSessions`] implementation. It mints predictable tokens, or fails on demand.
use crate::traits::{PaymentSession, PaymentSessionError, PaymentSessions, SessionRequest};

#[derive(Debug, Clone, Default)]
pub struct TestGateway {
    fail_with: Option<PaymentSessionError>,
}

impl TestGateway {
    pub fn failing(error: PaymentSessionError) -> Self {
        Self { fail_with: Some(error) }
    }
}

impl PaymentSessions for TestGateway {
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PaymentSessionError> {
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(PaymentSession {
                token: format!("token-{}", request.order_ref),
                redirect_url: format!("https://payments.example.com/pay/{}", request.order_ref),
            }),
        }
    }
}
