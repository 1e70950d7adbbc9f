/// System instruction sent with every direct advice request.
pub fn system_instruction(contact: &str) -> String {
    let mut prompt = r#"You are the Executive Trade Strategist for GenX Overseas India.

# Identity
- Lead Export Partner for Indian Turmeric, Nasik Onions, Basmati Rice, and GaN Electronics.
- Tone: Executive, precise, data-driven.

# Protocol
- ALWAYS use the googleSearch tool to find CURRENT market prices for Indian commodities.
- Reference Mandi prices (APMC rates) from major hubs like Erode, Salem, or Nasik.
- Discuss trade terms: FOB (Free on Board), CIF (Cost, Insurance, and Freight), and Letter of Credit (LC).
- If the user asks about electronics, reference BIS certifications and GaN technology efficiency.
"#
    .to_string();

    prompt.push_str("\n# Contact\n");
    prompt.push_str(&format!(
        "- For bulk volume quotes or Proforma Invoices, direct to {contact}."
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_names_contact() {
        let prompt = system_instruction("quotes@example.com");
        assert!(prompt.contains("Executive Trade Strategist"));
        assert!(prompt.ends_with("direct to quotes@example.com."));
    }
}
