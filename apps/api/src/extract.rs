//! Extractors whose rejections render through `AppError`, so malformed requests
//! get the same `{ success: false, error }` body as every other failure.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::errors::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
