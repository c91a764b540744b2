use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::models::{ApiResponse, ErrorCode, institutions::requests::OnboardingRequest};
use crate::services::access::current_user_id;
use crate::services::{bad_request, error_response};
use crate::utils::validate::require_text;

crate::services::lazy_service!(OnboardingService);

impl OnboardingService {
    /// 首次使用：创建（或复用同名）机构并在其中创建课程
    pub async fn onboard(
        &self,
        request: &HttpRequest,
        onboarding: OnboardingRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request);
        let user_id = match current_user_id(request) {
            Ok(id) => id,
            Err(resp) => return Ok(resp),
        };

        if let Err(msg) = require_text(&onboarding.institution_name, "institution_name")
            .and(require_text(&onboarding.course_name, "course_name"))
        {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }

        match storage.onboard(user_id, onboarding).await {
            Ok(result) => {
                info!(
                    "Onboarding for user {}: institution {} (created: {}), course {}",
                    user_id, result.institution.id, result.institution_created, result.course.id
                );
                Ok(HttpResponse::Created()
                    .json(ApiResponse::success(result, "Onboarding completed")))
            }
            Err(e) => Ok(error_response(&e, ErrorCode::CourseAlreadyExists)),
        }
    }
}
