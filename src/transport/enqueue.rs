use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::domain::{
    CheckingMessageId, Domain, Encoding, EnqueueBatch, MessageClass, Priority, RawPhoneNumber,
    ResultCode, SenderNumber,
};

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP_ENC_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SERVICE_NS: &str = "urn:SOAPSmsQueue";

/// `SOAPAction` header value; the service declares an empty action (quoted per SOAP 1.1).
pub const SOAP_ACTION: &str = "\"\"";

/// `Content-Type` of SOAP 1.1 requests.
pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

const UDH_FIELD: &str = "udhs";
const MESSAGE_BODY_FIELD: &str = "messageBodies";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to encode SOAP envelope: {0}")]
    Encode(String),

    #[error("invalid XML response: {0}")]
    Xml(String),

    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    #[error("response contains no enqueueResponse element")]
    MissingResponse,

    #[error("invalid result code: {value}")]
    InvalidResultCode { value: String },
}

pub fn encode_enqueue_envelope(batch: &EnqueueBatch) -> Result<String, TransportError> {
    let mut writer = Writer::new(Vec::new());

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    write(
        &mut writer,
        Event::Start(BytesStart::new("soapenv:Envelope").with_attributes([
            ("xmlns:soapenv", SOAP_ENV_NS),
            ("xmlns:soapenc", SOAP_ENC_NS),
            ("xmlns:xsd", XSD_NS),
            ("xmlns:xsi", XSI_NS),
            ("xmlns:urn", SERVICE_NS),
        ])),
    )?;
    write(&mut writer, Event::Start(BytesStart::new("soapenv:Body")))?;
    write(
        &mut writer,
        Event::Start(
            BytesStart::new("urn:enqueue")
                .with_attributes([("soapenv:encodingStyle", SOAP_ENC_NS)]),
        ),
    )?;

    write_scalar(
        &mut writer,
        Domain::FIELD,
        "xsd:string",
        batch.domain.as_str(),
    )?;
    write_array(
        &mut writer,
        MESSAGE_BODY_FIELD,
        "xsd:string",
        batch.message_bodies.iter().map(String::as_str),
    )?;
    write_array(
        &mut writer,
        RawPhoneNumber::FIELD,
        "xsd:string",
        batch.recipient_numbers.iter().map(RawPhoneNumber::raw),
    )?;
    write_array(
        &mut writer,
        SenderNumber::FIELD,
        "xsd:string",
        batch.sender_numbers.iter().map(SenderNumber::as_str),
    )?;
    let encodings = batch
        .encodings
        .iter()
        .map(|encoding| encoding.value().to_string())
        .collect::<Vec<_>>();
    write_array(
        &mut writer,
        Encoding::FIELD,
        "xsd:int",
        encodings.iter().map(String::as_str),
    )?;
    write_array(
        &mut writer,
        UDH_FIELD,
        "xsd:string",
        batch.udhs.iter().map(String::as_str),
    )?;
    write_array(
        &mut writer,
        MessageClass::FIELD,
        "xsd:string",
        batch.message_classes.iter().map(MessageClass::as_str),
    )?;
    let priorities = batch
        .priorities
        .iter()
        .map(|priority| priority.value().to_string())
        .collect::<Vec<_>>();
    write_array(
        &mut writer,
        Priority::FIELD,
        "xsd:int",
        priorities.iter().map(String::as_str),
    )?;
    let checking_ids = batch
        .checking_message_ids
        .iter()
        .map(|id| id.value().to_string())
        .collect::<Vec<_>>();
    write_array(
        &mut writer,
        CheckingMessageId::FIELD,
        "xsd:long",
        checking_ids.iter().map(String::as_str),
    )?;

    write(&mut writer, Event::End(BytesEnd::new("urn:enqueue")))?;
    write(&mut writer, Event::End(BytesEnd::new("soapenv:Body")))?;
    write(&mut writer, Event::End(BytesEnd::new("soapenv:Envelope")))?;

    String::from_utf8(writer.into_inner()).map_err(|err| TransportError::Encode(err.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), TransportError> {
    writer
        .write_event(event)
        .map_err(|err| TransportError::Encode(err.to_string()))
}

fn write_scalar(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    xsd_type: &str,
    value: &str,
) -> Result<(), TransportError> {
    write(
        writer,
        Event::Start(BytesStart::new(name).with_attributes([("xsi:type", xsd_type)])),
    )?;
    write(writer, Event::Text(BytesText::new(value)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write_array<'v>(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    xsd_type: &str,
    values: impl ExactSizeIterator<Item = &'v str>,
) -> Result<(), TransportError> {
    let array_type = format!("{xsd_type}[{}]", values.len());
    write(
        writer,
        Event::Start(BytesStart::new(name).with_attributes([
            ("soapenc:arrayType", array_type.as_str()),
            ("xsi:type", "soapenc:Array"),
        ])),
    )?;
    for value in values {
        write_scalar(writer, "item", xsd_type, value)?;
    }
    write(writer, Event::End(BytesEnd::new(name)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaultField {
    Code,
    Message,
}

/// Collect the result codes of an `enqueue` response in document order.
///
/// Codes are the numeric leaves under `enqueueResponse` (and under `multiRef` elements, which
/// rpc/encoded servers may use to carry the array out of line). A nil or empty return decodes to
/// an empty vector.
pub fn decode_enqueue_response(xml: &str) -> Result<Vec<ResultCode>, TransportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut result_depth: Option<usize> = None;
    let mut saw_response = false;
    let mut codes = Vec::new();

    let mut saw_fault = false;
    let mut fault_field: Option<FaultField> = None;
    let mut fault_code = String::new();
    let mut fault_message = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| TransportError::Xml(err.to_string()))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                match start.local_name().as_ref() {
                    b"enqueueResponse" => {
                        saw_response = true;
                        result_depth.get_or_insert(depth);
                    }
                    b"multiRef" => {
                        result_depth.get_or_insert(depth);
                    }
                    b"Fault" => saw_fault = true,
                    b"faultcode" => fault_field = Some(FaultField::Code),
                    b"faultstring" => fault_field = Some(FaultField::Message),
                    _ => {}
                }
            }
            Event::Empty(start) => {
                if start.local_name().as_ref() == b"enqueueResponse" {
                    saw_response = true;
                }
            }
            Event::End(end) => {
                if result_depth == Some(depth) {
                    result_depth = None;
                }
                if matches!(end.local_name().as_ref(), b"faultcode" | b"faultstring") {
                    fault_field = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                if result_depth.is_some() {
                    let value = std::str::from_utf8(&text)
                        .map_err(|err| TransportError::Xml(err.to_string()))?
                        .trim();
                    if value.is_empty() {
                        continue;
                    }
                    let code = value
                        .parse::<i64>()
                        .map_err(|_| TransportError::InvalidResultCode {
                            value: value.to_owned(),
                        })?;
                    codes.push(ResultCode::new(code));
                } else if let Some(field) = fault_field {
                    let value = text
                        .unescape()
                        .map_err(|err| TransportError::Xml(err.to_string()))?;
                    match field {
                        FaultField::Code => fault_code.push_str(&value),
                        FaultField::Message => fault_message.push_str(&value),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if saw_fault {
        return Err(TransportError::Fault {
            code: fault_code,
            message: fault_message,
        });
    }
    if !saw_response {
        return Err(TransportError::MissingResponse);
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GatewayConfig, SendSms};

    fn batch(recipients: &[&str]) -> EnqueueBatch {
        let config = GatewayConfig::new("alerts", "pw", "magfa", "30001234")
            .unwrap()
            .with_checking_message_id(CheckingMessageId::new(77));
        let recipients = recipients
            .iter()
            .map(|raw| RawPhoneNumber::new(*raw).unwrap())
            .collect();
        EnqueueBatch::broadcast(&config, &SendSms::new("cpu > 90% & <rising>", recipients))
    }

    fn response(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soapenv:Body>{body}</soapenv:Body>
</soapenv:Envelope>"#
        )
    }

    #[test]
    fn encodes_parameters_in_operation_order() {
        let xml = encode_enqueue_envelope(&batch(&["+989121111111", "+989122222222"])).unwrap();

        let order = [
            "<domain ",
            "<messageBodies ",
            "<recipientNumbers ",
            "<senderNumbers ",
            "<encodings ",
            "<udhs ",
            "<messageClasses ",
            "<priorities ",
            "<checkingMessageIds ",
        ];
        let positions = order
            .iter()
            .map(|tag| xml.find(tag).unwrap_or_else(|| panic!("missing {tag} in {xml}")))
            .collect::<Vec<_>>();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(xml.contains(r#"<urn:enqueue soapenv:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#));
    }

    #[test]
    fn encodes_array_lengths_and_escapes_text() {
        let xml = encode_enqueue_envelope(&batch(&["+989121111111", "+989122222222"])).unwrap();

        assert!(xml.contains(r#"<recipientNumbers soapenc:arrayType="xsd:string[2]""#));
        assert!(xml.contains(r#"<messageBodies soapenc:arrayType="xsd:string[1]""#));
        assert!(xml.contains(r#"<senderNumbers soapenc:arrayType="xsd:string[1]""#));
        assert!(xml.contains(r#"<udhs soapenc:arrayType="xsd:string[0]""#));
        assert!(xml.contains(r#"<checkingMessageIds soapenc:arrayType="xsd:long[1]""#));
        assert!(xml.contains(r#"<item xsi:type="xsd:long">77</item>"#));
        assert!(xml.contains("cpu &gt; 90% &amp; &lt;rising&gt;"));
        assert!(xml.contains(r#"<domain xsi:type="xsd:string">magfa</domain>"#));
    }

    #[test]
    fn decodes_inline_result_array() {
        let xml = response(
            r#"<ns1:enqueueResponse xmlns:ns1="urn:SOAPSmsQueue">
                 <enqueueReturn xsi:type="soapenc:Array">
                   <item xsi:type="xsd:long">718570969</item>
                   <item xsi:type="xsd:long">718570970</item>
                 </enqueueReturn>
               </ns1:enqueueResponse>"#,
        );
        let codes = decode_enqueue_response(&xml).unwrap();
        assert_eq!(
            codes,
            vec![ResultCode::new(718_570_969), ResultCode::new(718_570_970)]
        );
    }

    #[test]
    fn decodes_negative_and_multiref_codes() {
        let xml = response(
            r##"<ns1:enqueueResponse xmlns:ns1="urn:SOAPSmsQueue">
                 <enqueueReturn href="#id0"/>
               </ns1:enqueueResponse>
               <multiRef id="id0"><item>-1</item></multiRef>"##,
        );
        assert_eq!(
            decode_enqueue_response(&xml).unwrap(),
            vec![ResultCode::new(-1)]
        );
    }

    #[test]
    fn nil_return_decodes_to_empty() {
        let xml = response(
            r#"<ns1:enqueueResponse xmlns:ns1="urn:SOAPSmsQueue"><enqueueReturn xsi:nil="true"/></ns1:enqueueResponse>"#,
        );
        assert!(decode_enqueue_response(&xml).unwrap().is_empty());

        let xml = response(r#"<ns1:enqueueResponse xmlns:ns1="urn:SOAPSmsQueue"/>"#);
        assert!(decode_enqueue_response(&xml).unwrap().is_empty());
    }

    #[test]
    fn fault_is_reported_with_code_and_message() {
        let xml = response(
            r#"<soapenv:Fault>
                 <faultcode>soapenv:Server.userException</faultcode>
                 <faultstring>java.lang.NullPointerException &amp; more</faultstring>
               </soapenv:Fault>"#,
        );
        match decode_enqueue_response(&xml).unwrap_err() {
            TransportError::Fault { code, message } => {
                assert_eq!(code, "soapenv:Server.userException");
                assert_eq!(message, "java.lang.NullPointerException & more");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_response_and_bad_codes_are_errors() {
        let xml = response("<somethingElse/>");
        assert!(matches!(
            decode_enqueue_response(&xml),
            Err(TransportError::MissingResponse)
        ));

        let xml = response(
            r#"<enqueueResponse><enqueueReturn><item>abc</item></enqueueReturn></enqueueResponse>"#,
        );
        assert!(matches!(
            decode_enqueue_response(&xml),
            Err(TransportError::InvalidResultCode { .. })
        ));

        assert!(decode_enqueue_response("<unclosed>").is_err());
    }
}
