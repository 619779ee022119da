//! gRPC transport adapter.

mod user_grpc;

pub use user_grpc::UserGrpcService;
