pub mod plan_request;
pub mod plan_route;
