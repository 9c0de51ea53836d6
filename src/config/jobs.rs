//! Background job settings

use serde::Deserialize;

use super::error::ValidationError;

/// Names used by the scheduled coupon report and the CRM queue.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Name under which the coupon usage job records its successful runs.
    #[serde(default = "default_coupon_usage_job_name")]
    pub coupon_usage_job_name: String,

    /// CRM template enqueued after a successful production purchase.
    #[serde(default = "default_payment_success_template")]
    pub payment_success_template: String,
}

impl JobsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.coupon_usage_job_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("JOBS__COUPON_USAGE_JOB_NAME"));
        }
        if self.payment_success_template.trim().is_empty() {
            return Err(ValidationError::MissingRequired("JOBS__PAYMENT_SUCCESS_TEMPLATE"));
        }
        Ok(())
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            coupon_usage_job_name: default_coupon_usage_job_name(),
            payment_success_template: default_payment_success_template(),
        }
    }
}

fn default_coupon_usage_job_name() -> String {
    "coupon-usage-report".to_string()
}

fn default_payment_success_template() -> String {
    "payment-success".to_string()
}
