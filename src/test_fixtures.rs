//! Small DrugBank-shaped document shared by the tests

pub const DRUGBANK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<drugbank xmlns="http://www.drugbank.ca" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" version="5.1" exported-on="2020-07-02">
<drug type="biotech" created="2005-06-13" updated="2020-06-18">
  <drugbank-id primary="true">DB00001</drugbank-id>
  <drugbank-id>BTD00024</drugbank-id>
  <drugbank-id>BIOD00024</drugbank-id>
  <name>Lepirudin</name>
  <description>Lepirudin is identical to natural hirudin except for substitution of leucine for isoleucine.</description>
  <cas-number>138068-37-8</cas-number>
  <unii>Y43GF64R34</unii>
  <state>liquid</state>
  <groups>
    <group>approved</group>
  </groups>
  <general-references>
    <articles>
      <article>
        <ref-id>A1</ref-id>
        <pubmed-id>16244762</pubmed-id>
        <citation>Smith LA: Pharmacokinetics of lepirudin. Am J Health Syst Pharm. 2005.</citation>
      </article>
      <article>
        <ref-id>A2</ref-id>
        <pubmed-id>16690967</pubmed-id>
        <citation>Tardy B: Lepirudin in heparin-induced thrombocytopenia. Blood. 2006.</citation>
      </article>
    </articles>
    <textbooks/>
    <links/>
  </general-references>
  <synonyms>
    <synonym language="english" coder="">Hirudin variant-1</synonym>
  </synonyms>
  <products>
    <product>
      <name>Refludan</name>
      <labeller>Bayer</labeller>
      <dosage-form>Powder, for solution</dosage-form>
      <route>Intravenous</route>
    </product>
  </products>
  <atc-codes>
    <atc-code code="B01AE02">
      <level code="B01AE">Direct thrombin inhibitors</level>
      <level code="B01A">ANTITHROMBOTIC AGENTS</level>
      <level code="B01">ANTITHROMBOTIC AGENTS</level>
      <level code="B">BLOOD AND BLOOD FORMING ORGANS</level>
    </atc-code>
  </atc-codes>
  <sequences>
    <sequence format="FASTA">&gt;Lepirudin
LVYTDCTESGQNLCLCEGSNVCGQGNKCILGSDGEKNQCVTGEGTPKPQSHNDGDFEEIPEEYLQ</sequence>
  </sequences>
  <reactions/>
  <targets>
    <target position="1">
      <id>BE0000048</id>
      <name>Prothrombin</name>
      <organism>Humans</organism>
      <actions>
        <action>inhibitor</action>
      </actions>
      <references>
        <articles/>
      </references>
      <known-action>yes</known-action>
      <polypeptide id="P00734" source="Swiss-Prot">
        <name>Prothrombin</name>
      </polypeptide>
    </target>
  </targets>
</drug>
<drug type="biotech" created="2005-06-13" updated="2020-06-12">
  <drugbank-id primary="true">DB00002</drugbank-id>
  <drugbank-id>BTD00071</drugbank-id>
  <name>Cetuximab</name>
  <cas-number>205923-56-4</cas-number>
  <groups>
    <group>approved</group>
    <group>investigational</group>
  </groups>
  <products>
    <product>
      <name>Erbitux</name>
      <labeller>ImClone</labeller>
      <generic>false</generic>
    </product>
  </products>
  <atc-codes>
    <atc-code code="L01XC06">
      <level code="L01XC">Monoclonal antibodies</level>
      <level code="L01X">OTHER ANTINEOPLASTIC AGENTS</level>
    </atc-code>
  </atc-codes>
</drug>
<drug type="small molecule" created="2005-06-13" updated="2020-06-19">
  <drugbank-id primary="true">DB00003</drugbank-id>
  <name>Dornase alfa</name>
  <groups>
    <group>experimental</group>
  </groups>
  <reactions>
    <reaction>
      <sequence>1</sequence>
      <left-element>
        <drugbank-id>DB00003</drugbank-id>
        <name>Dornase alfa</name>
      </left-element>
      <right-element>
        <drugbank-id>DBMET00003</drugbank-id>
        <name>Dornase alfa metabolite</name>
      </right-element>
    </reaction>
  </reactions>
</drug>
</drugbank>
"#;
