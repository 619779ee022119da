//! gRPC implementation for UserService.
//!
//! Decodes requests into domain DTOs, calls the shared domain service and
//! maps its errors through `From<AppError> for Status`.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::debug;

use common::parse_user_id;
use domain::{CreateUser, UpdateUser};

use crate::service::UserService;
use proto::user::{
    user_service_server::UserService as UserServiceProto, CreateRequest, CreateResponse,
    DeleteRequest, DeleteResponse, GetAllRequest, GetAllResponse, GetByEmailAndPasswordRequest,
    GetByUuidRequest, UpdateRequest, UpdateResponse, User as ProtoUser, UserResponse,
};

/// gRPC service wrapper for UserService.
pub struct UserGrpcService {
    service: Arc<dyn UserService>,
}

impl UserGrpcService {
    /// Create a new gRPC service wrapper.
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl UserServiceProto for UserGrpcService {
    async fn create(
        &self,
        request: Request<CreateRequest>,
    ) -> Result<Response<CreateResponse>, Status> {
        debug!("Create user");
        let req = request.into_inner();

        let id = self
            .service
            .create(CreateUser {
                name: req.name,
                email: req.email,
                password: req.password,
                password_confirmation: req.password_confirmation,
            })
            .await?;
        Ok(Response::new(CreateResponse {
            uuid: id.to_string(),
        }))
    }

    async fn get_all(
        &self,
        _request: Request<GetAllRequest>,
    ) -> Result<Response<GetAllResponse>, Status> {
        debug!("Get all users");
        let users = self.service.get_all().await?;

        Ok(Response::new(GetAllResponse {
            users: users.into_iter().map(user_to_proto).collect(),
        }))
    }

    async fn get_by_uuid(
        &self,
        request: Request<GetByUuidRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        debug!("Get user by uuid");
        let id = parse_user_id(&request.into_inner().uuid)?;

        let user = self.service.get_by_uuid(id).await?;
        Ok(Response::new(UserResponse {
            user: Some(user_to_proto(user)),
        }))
    }

    async fn get_by_email_and_password(
        &self,
        request: Request<GetByEmailAndPasswordRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        debug!("Get user by email and password");
        let req = request.into_inner();

        let user = self
            .service
            .get_by_email_and_password(&req.email, &req.password)
            .await?;
        Ok(Response::new(UserResponse {
            user: Some(user_to_proto(user)),
        }))
    }

    async fn update(
        &self,
        request: Request<UpdateRequest>,
    ) -> Result<Response<UpdateResponse>, Status> {
        debug!("Partially update user");
        let req = request.into_inner();
        let id = parse_user_id(&req.uuid)?;

        self.service
            .update(UpdateUser {
                id,
                password: req.password,
                name: req.name,
                email: req.email,
                new_password: req.new_password,
                new_password_confirmation: req.new_password_confirmation,
            })
            .await?;
        Ok(Response::new(UpdateResponse {}))
    }

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        debug!("Delete user");
        let id = parse_user_id(&request.into_inner().uuid)?;

        self.service.delete(id).await?;
        Ok(Response::new(DeleteResponse {}))
    }
}

/// Convert domain User to proto User.
fn user_to_proto(user: domain::User) -> ProtoUser {
    ProtoUser {
        uuid: user.id.to_string(),
        name: user.name,
        email: user.email,
        password: user.password_hash,
    }
}
