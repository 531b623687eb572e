use base64::{engine::general_purpose::STANDARD, Engine as _};

/// `=_` never occurs inside base64 lines, so the boundary cannot collide with
/// the encoded attachment.
const BOUNDARY: &str = "=_mail_csv_import_part";
const LINE_WIDTH: usize = 76;

/// A message with a single binary attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
}

impl OutgoingMail {
    /// Renders the message as RFC 5322 text with a `multipart/mixed` body.
    /// The attachment is sent as `application/octet-stream`, base64 encoded.
    pub fn to_rfc5322(&self) -> Vec<u8> {
        let mut out = String::new();

        out.push_str(&format!("From: {}\r\n", self.from));
        out.push_str(&format!("To: {}\r\n", self.to));
        out.push_str(&format!("Subject: {}\r\n", encode_header(&self.subject)));
        out.push_str("MIME-Version: 1.0\r\n");
        out.push_str(&format!(
            "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
            BOUNDARY
        ));

        out.push_str(&format!("--{}\r\n", BOUNDARY));
        out.push_str("Content-Type: application/octet-stream\r\n");
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
            self.attachment_name.replace('"', "'")
        ));

        let encoded = STANDARD.encode(&self.attachment);
        for line in encoded.as_bytes().chunks(LINE_WIDTH) {
            // base64 output is ASCII
            out.push_str(&String::from_utf8_lossy(line));
            out.push_str("\r\n");
        }

        out.push_str(&format!("--{}--\r\n", BOUNDARY));
        out.into_bytes()
    }
}

/// RFC 2047 encoded word for non-ASCII header values.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(attachment: &[u8]) -> OutgoingMail {
        OutgoingMail {
            from: "ops@example.com".to_string(),
            to: "ops@example.com".to_string(),
            subject: "MANTIS CSV 2024-05-01 09:30".to_string(),
            attachment_name: "mantis_project_1_2024-05-01 09-30.csv".to_string(),
            attachment: attachment.to_vec(),
        }
    }

    fn body_of(rendered: &str) -> String {
        let start = rendered.find("\r\n\r\n--").unwrap();
        let part = &rendered[start..];
        let payload_start = part.find("filename=").unwrap();
        let payload = &part[payload_start..];
        let payload = &payload[payload.find("\r\n\r\n").unwrap() + 4..];
        let end = payload.find(&format!("--{}--", BOUNDARY)).unwrap();
        payload[..end].replace("\r\n", "")
    }

    #[test]
    fn test_headers() {
        let rendered = String::from_utf8(mail(b"a,b\n").to_rfc5322()).unwrap();

        assert!(rendered.starts_with("From: ops@example.com\r\nTo: ops@example.com\r\n"));
        assert!(rendered.contains("Subject: MANTIS CSV 2024-05-01 09:30\r\n"));
        assert!(rendered.contains("Content-Type: application/octet-stream\r\n"));
        assert!(rendered.contains(
            "Content-Disposition: attachment; filename=\"mantis_project_1_2024-05-01 09-30.csv\""
        ));
        assert!(rendered.ends_with(&format!("--{}--\r\n", BOUNDARY)));
    }

    #[test]
    fn test_attachment_is_base64_in_short_lines() {
        let csv = "id,summary\n1,ログイン画面\n".repeat(20);
        let rendered = String::from_utf8(mail(csv.as_bytes()).to_rfc5322()).unwrap();

        assert!(rendered.lines().all(|line| line.len() <= 998));
        let decoded = STANDARD.decode(body_of(&rendered)).unwrap();
        assert_eq!(decoded, csv.as_bytes());
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        let mut mail = mail(b"");
        mail.subject = "報告".to_string();
        let rendered = String::from_utf8(mail.to_rfc5322()).unwrap();

        assert!(rendered.contains(&format!("Subject: =?UTF-8?B?{}?=\r\n", STANDARD.encode("報告"))));
    }
}
