use crate::otp::{CODE_VALID_MINUTES, OtpPurpose, subject_label};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

// Pure: subject, HTML and plaintext from the code and the caller's purpose string.
// Unknown purposes get the generic title but keep their own name in the subject.
pub fn render_otp_email(brand: &str, code: &str, purpose: &str, name: Option<&str>) -> RenderedEmail {
    RenderedEmail {
        subject: format!("Your OTP Code - {}", subject_label(purpose)),
        html: render_html(brand, code, OtpPurpose::from_name(purpose), name),
        text: render_text(brand, code),
    }
}

fn greeting(name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => format!("Dear {},", html_escape::encode_text(n)),
        None => "Hello,".to_string(),
    }
}

fn render_text(brand: &str, code: &str) -> String {
    format!(
        "Your OTP Code is: {code}\n\n\
         This code is valid for {CODE_VALID_MINUTES} minutes.\n\n\
         If you didn't request this, please ignore this email.\n\n\
         - {brand}"
    )
}

fn render_html(brand: &str, code: &str, purpose: OtpPurpose, name: Option<&str>) -> String {
    let brand = html_escape::encode_text(brand);
    let code = html_escape::encode_text(code);
    let title = purpose.title();
    let greeting = greeting(name);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
  body {{ margin: 0; padding: 0; font-family: Helvetica, Arial, sans-serif; background: #f4f4f4; }}
  .container {{ max-width: 600px; margin: 0 auto; background: #ffffff; }}
  .header {{ background: #2d3748; padding: 24px; text-align: center; color: #ffffff; font-size: 22px; font-weight: bold; }}
  .content {{ padding: 32px 28px; color: #4a5568; line-height: 1.6; }}
  .title {{ font-size: 20px; font-weight: bold; color: #1a202c; margin-bottom: 16px; }}
  .code-box {{ background: #edf2f7; border-radius: 8px; padding: 20px; text-align: center; margin: 28px 0; }}
  .code {{ font-family: 'Courier New', monospace; font-size: 34px; font-weight: bold; letter-spacing: 8px; color: #1a202c; }}
  .expiry {{ font-size: 12px; margin-top: 8px; }}
  .notice {{ background: #fffbea; border-left: 4px solid #d69e2e; padding: 12px 16px; font-size: 13px; }}
  .footer {{ padding: 18px; text-align: center; font-size: 12px; color: #a0aec0; border-top: 1px solid #e2e8f0; }}
</style>
</head>
<body>
<div class="container">
  <div class="header">{brand}</div>
  <div class="content">
    <div class="title">{title}</div>
    <p>{greeting}</p>
    <p>You requested a verification code. Use the one-time password below to complete your request:</p>
    <div class="code-box">
      <div class="code">{code}</div>
      <div class="expiry">Valid for {CODE_VALID_MINUTES} minutes</div>
    </div>
    <div class="notice">
      <strong>Security notice:</strong> never share this code with anyone. We will never ask you for it.
      If you didn't request this code, you can safely ignore this email.
    </div>
  </div>
  <div class="footer">This is an automated message from {brand}. Please do not reply.</div>
</div>
</body>
</html>
"#
    )
}
