/// Request/response structs and their thrift binary encoding
use crate::context::Context;
use crate::error::{Error, Result};
use crate::level::Level;
use crate::rpc::reply::STATUS_OK;
use thrift::protocol::{
    TFieldIdentifier, TInputProtocol, TListIdentifier, TOutputProtocol, TStructIdentifier, TType,
};
use thrift::{ProtocolError, ProtocolErrorKind};

/// One log call as it travels from plugin to host.
///
/// ```thrift
/// struct ContextPair { 1: string key, 2: string value }
/// struct LogRequest {
///   1: optional i32 level,
///   2: optional string message,
///   3: optional list<ContextPair> context,
/// }
/// ```
///
/// The level stays raw so that a bad value reaches the server and is
/// answered with a failure status rather than tearing down the channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRequest {
    level: Option<i32>,
    message: Option<String>,
    context: Option<Context>,
}

impl LogRequest {
    /// Request for a level-specific emit method (`Trace` .. `Fatal`).
    pub fn emit(message: &str, context: Option<&Context>) -> Self {
        Self {
            level: None,
            message: Some(message.to_string()),
            context: context.cloned(),
        }
    }

    /// Request for the generic `Log` method.
    pub fn log(level: Level, message: &str, context: Option<&Context>) -> Self {
        Self {
            level: Some(level.into()),
            message: Some(message.to_string()),
            context: context.cloned(),
        }
    }

    pub fn set_level(level: Level) -> Self {
        Self {
            level: Some(level.into()),
            ..Self::default()
        }
    }

    /// Request without arguments, used by the level predicates.
    pub fn query() -> Self {
        Self::default()
    }

    pub fn level(&self) -> Result<Level> {
        let raw = self.level.ok_or(Error::MissingField("level"))?;
        Level::try_from(raw)
    }

    /// The message, or an empty string when none was sent.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<LogRequest> {
        let mut request = LogRequest::default();
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_ident.id {
                Some(1) => request.level = Some(i_prot.read_i32()?),
                Some(2) => request.message = Some(i_prot.read_string()?),
                Some(3) => request.context = Some(read_context(i_prot)?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(request)
    }

    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("LogRequest"))?;
        if let Some(level) = self.level {
            o_prot.write_field_begin(&TFieldIdentifier::new("level", TType::I32, 1))?;
            o_prot.write_i32(level)?;
            o_prot.write_field_end()?;
        }
        if let Some(ref message) = self.message {
            o_prot.write_field_begin(&TFieldIdentifier::new("message", TType::String, 2))?;
            o_prot.write_string(message)?;
            o_prot.write_field_end()?;
        }
        if let Some(ref context) = self.context {
            o_prot.write_field_begin(&TFieldIdentifier::new("context", TType::List, 3))?;
            write_context(context, o_prot)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

fn read_context(i_prot: &mut dyn TInputProtocol) -> thrift::Result<Context> {
    let list_ident = i_prot.read_list_begin()?;
    let mut context = Context::new();
    for _ in 0..list_ident.size {
        let mut key = None;
        let mut value = None;
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_ident.id {
                Some(1) => key = Some(i_prot.read_string()?),
                Some(2) => value = Some(i_prot.read_string()?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        context.push(key.unwrap_or_default(), value.unwrap_or_default());
    }
    i_prot.read_list_end()?;
    Ok(context)
}

fn write_context(context: &Context, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
    let size = i32::try_from(context.len()).map_err(|_| {
        thrift::Error::Protocol(ProtocolError::new(
            ProtocolErrorKind::SizeLimit,
            format!("context has too many pairs: {}", context.len()),
        ))
    })?;
    o_prot.write_list_begin(&TListIdentifier::new(TType::Struct, size))?;
    for (key, value) in context.iter() {
        o_prot.write_struct_begin(&TStructIdentifier::new("ContextPair"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("key", TType::String, 1))?;
        o_prot.write_string(key)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("value", TType::String, 2))?;
        o_prot.write_string(value)?;
        o_prot.write_field_end()?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()?;
    }
    o_prot.write_list_end()
}

/// Status of a serviced call. Code 0 is success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStatus {
    pub code: i32,
    pub message: Option<String>,
}

impl CallStatus {
    pub fn new(code: i32, message: Option<String>) -> Self {
        Self { code, message }
    }

    fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<CallStatus> {
        let mut status = CallStatus::default();
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_ident.id {
                Some(1) => status.code = i_prot.read_i32()?,
                Some(2) => status.message = Some(i_prot.read_string()?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(status)
    }

    fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("CallStatus"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("code", TType::I32, 1))?;
        o_prot.write_i32(self.code)?;
        o_prot.write_field_end()?;
        if let Some(ref message) = self.message {
            o_prot.write_field_begin(&TFieldIdentifier::new("message", TType::String, 2))?;
            o_prot.write_string(message)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

/// Answer to one [`LogRequest`].
///
/// ```thrift
/// struct LogResponse { 1: required CallStatus status, 2: optional bool enabled }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogResponse {
    pub status: CallStatus,
    pub enabled: Option<bool>,
}

impl LogResponse {
    /// Turn a failure status into [`Error::Remote`]; otherwise yield the
    /// predicate result, if any.
    pub fn into_result(self) -> Result<Option<bool>> {
        if self.status.code != STATUS_OK {
            return Err(Error::Remote {
                code: self.status.code,
                message: self.status.message.unwrap_or_default(),
            });
        }
        Ok(self.enabled)
    }

    pub fn read_from_in_protocol(i_prot: &mut dyn TInputProtocol) -> thrift::Result<LogResponse> {
        let mut status = None;
        let mut enabled = None;
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_ident.id {
                Some(1) => status = Some(CallStatus::read_from_in_protocol(i_prot)?),
                Some(2) => enabled = Some(i_prot.read_bool()?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        let status = status.ok_or_else(|| {
            thrift::Error::Protocol(ProtocolError::new(
                ProtocolErrorKind::InvalidData,
                "LogResponse is missing required field status",
            ))
        })?;
        Ok(LogResponse { status, enabled })
    }

    pub fn write_to_out_protocol(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("LogResponse"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("status", TType::Struct, 1))?;
        self.status.write_to_out_protocol(o_prot)?;
        o_prot.write_field_end()?;
        if let Some(enabled) = self.enabled {
            o_prot.write_field_begin(&TFieldIdentifier::new("enabled", TType::Bool, 2))?;
            o_prot.write_bool(enabled)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}
