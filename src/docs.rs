use utoipa::OpenApi;

use nanapatha_core::{ErrorKind, ErrorResponse, PaginationMeta};
use nanapatha_models::batches::{
    Batch, BatchDetail, BatchRoster, BatchStudentDto, BatchSummary, CreateBatchDto,
    PaginatedBatchesResponse, ReconcileReport, RosterEntry, SetBatchTeacherDto, UpdateBatchDto,
};
use nanapatha_models::class_sessions::{
    ClassSession, ClassSessionDetail, CreateClassSessionDto, PaginatedClassSessionsResponse,
    UpdateSessionStatusDto,
};
use nanapatha_models::classrooms::{
    Classroom, CreateClassroomDto, PaginatedClassroomsResponse, UpdateClassroomDto,
};
use nanapatha_models::dashboard::DashboardStats;
use nanapatha_models::enums::{
    ClassType, PaymentStatus, RegistrationStatus, RegistrationType, SessionStatus, UserRole,
    UserStatus,
};
use nanapatha_models::ids::{
    BatchId, ClassSessionId, ClassroomId, RegistrationRequestId, StudentProfileId,
    TeacherProfileId, UserId,
};
use nanapatha_models::registrations::{
    AcceptedRegistration, PaginatedRegistrationsResponse, RegistrationDetail, RegistrationRequest,
    RegistrationStatusFilter, RejectRegistrationDto, SubmitExistingRegistrationDto,
    SubmitNewRegistrationDto,
};
use nanapatha_models::schedule::ScheduleView;
use nanapatha_models::students::{
    AssignBatchDto, CreateStudentDto, CreatedStudent, PaginatedStudentsResponse, Student,
    StudentBatchAssignment, StudentProfile, UpdateStudentDto,
};
use nanapatha_models::teachers::{
    CreateTeacherDto, CreatedTeacher, PaginatedTeachersResponse, Teacher, TeacherBatchAssignment,
    TeacherPerformance, TeacherProfile, TeachingLoad, UpdateTeacherDto,
};
use nanapatha_models::users::{MessageResponse, User};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::registrations::controller::submit_new_registration,
        crate::modules::registrations::controller::submit_existing_registration,
        crate::modules::registrations::controller::get_registrations,
        crate::modules::registrations::controller::get_registration,
        crate::modules::registrations::controller::accept_registration,
        crate::modules::registrations::controller::reject_registration,
        crate::modules::registrations::controller::claim_registration,
        crate::modules::registrations::controller::release_registration,
        crate::modules::registrations::controller::mark_registration_paid,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::deactivate_student,
        crate::modules::students::controller::assign_student_batch,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::deactivate_teacher,
        crate::modules::teachers::controller::assign_teacher_batch,
        crate::modules::teachers::controller::get_teacher_load,
        crate::modules::teachers::controller::get_teacher_performance,
        crate::modules::teachers::controller::get_teacher_schedule,
        crate::modules::batches::controller::create_batch,
        crate::modules::batches::controller::get_batches,
        crate::modules::batches::controller::get_batch,
        crate::modules::batches::controller::update_batch,
        crate::modules::batches::controller::archive_batch,
        crate::modules::batches::controller::get_batch_roster,
        crate::modules::batches::controller::add_batch_student,
        crate::modules::batches::controller::remove_batch_student,
        crate::modules::batches::controller::set_batch_teacher,
        crate::modules::batches::controller::reconcile_enrollment,
        crate::modules::classrooms::controller::create_classroom,
        crate::modules::classrooms::controller::get_classrooms,
        crate::modules::classrooms::controller::get_classroom,
        crate::modules::classrooms::controller::update_classroom,
        crate::modules::classrooms::controller::archive_classroom,
        crate::modules::schedule::controller::get_schedule,
        crate::modules::schedule::controller::create_session,
        crate::modules::schedule::controller::get_sessions,
        crate::modules::schedule::controller::get_session,
        crate::modules::schedule::controller::update_session_status,
        crate::modules::dashboard::controller::get_dashboard,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::delete_user,
    ),
    components(
        schemas(
            ErrorResponse,
            ErrorKind,
            PaginationMeta,
            MessageResponse,
            UserId,
            StudentProfileId,
            TeacherProfileId,
            BatchId,
            ClassroomId,
            ClassSessionId,
            RegistrationRequestId,
            UserRole,
            UserStatus,
            ClassType,
            RegistrationType,
            RegistrationStatus,
            PaymentStatus,
            SessionStatus,
            User,
            RegistrationRequest,
            RegistrationDetail,
            RegistrationStatusFilter,
            SubmitNewRegistrationDto,
            SubmitExistingRegistrationDto,
            RejectRegistrationDto,
            AcceptedRegistration,
            PaginatedRegistrationsResponse,
            Student,
            StudentProfile,
            CreateStudentDto,
            CreatedStudent,
            UpdateStudentDto,
            AssignBatchDto,
            StudentBatchAssignment,
            PaginatedStudentsResponse,
            Teacher,
            TeacherProfile,
            CreateTeacherDto,
            CreatedTeacher,
            UpdateTeacherDto,
            TeacherBatchAssignment,
            TeachingLoad,
            TeacherPerformance,
            PaginatedTeachersResponse,
            Batch,
            BatchSummary,
            BatchDetail,
            BatchRoster,
            RosterEntry,
            CreateBatchDto,
            UpdateBatchDto,
            BatchStudentDto,
            SetBatchTeacherDto,
            ReconcileReport,
            PaginatedBatchesResponse,
            Classroom,
            CreateClassroomDto,
            UpdateClassroomDto,
            PaginatedClassroomsResponse,
            ClassSession,
            ClassSessionDetail,
            CreateClassSessionDto,
            UpdateSessionStatusDto,
            PaginatedClassSessionsResponse,
            ScheduleView,
            DashboardStats,
        )
    ),
    tags(
        (name = "Registrations", description = "Public sign-up and the staff review workflow"),
        (name = "Students", description = "Student management endpoints"),
        (name = "Teachers", description = "Teacher management, load and performance"),
        (name = "Batches", description = "Batch management and seat assignment"),
        (name = "Classrooms", description = "Classroom management endpoints"),
        (name = "Schedule", description = "Week, today, active and upcoming sessions"),
        (name = "Sessions", description = "Class session management"),
        (name = "Dashboard", description = "Back office overview"),
        (name = "Users", description = "User account endpoints")
    ),
    info(
        title = "Nanapatha API",
        version = "0.1.0",
        description = "Back office API for a tutoring institute: registrations, batches, teachers and the class schedule.",
        contact(
            name = "API Support",
            email = "support@nanapatha.lk"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_workflow_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| *p == "/api/registrations/{id}/accept"));
        assert!(paths.iter().any(|p| *p == "/api/batches/{id}/students"));
        assert!(paths.iter().any(|p| *p == "/api/schedule"));
    }

    #[test]
    fn openapi_registers_error_schema() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");

        assert!(components.schemas.contains_key("ErrorResponse"));
        assert!(components.schemas.contains_key("ScheduleView"));
    }
}
