pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
