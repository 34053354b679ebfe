/// Generate client methods with oneshot channel boilerplate and automatic tracing.
///
/// The request variant's fields must be named like the method parameters,
/// plus `respond_to`.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

/// Generate a fire-and-forget `shutdown` for a hand-written service client.
macro_rules! client_shutdown {
    ($client:ty, $request:ident, $error_type:ty) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn shutdown(&self) -> Result<(), $error_type> {
                tracing::debug!("Sending shutdown");
                self.sender
                    .send($request::Shutdown)
                    .await
                    .map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))
            }
        }
    };
}

/// Generate read methods (`get_<entity>`, `list_<entity>s`) for clients
/// wrapping a `ResourceClient`.
macro_rules! impl_resource_reads {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: String) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $entity_name_snake s>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.list().await.map_err(<$error>::from)
                }
            }
        }
    };
}
